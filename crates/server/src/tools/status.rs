//! cache_status tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use swcache_client::LifecycleController;

use super::json_result;

pub async fn status_impl(controller: &LifecycleController) -> Result<CallToolResult, McpError> {
    let status = controller.status().await?;
    json_result(&status)
}
