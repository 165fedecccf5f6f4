//! lifecycle_install, lifecycle_activate and post_message tools.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::{ActivateReport, InstallReport, LifecycleController, LifecycleState};

use super::json_result;

/// Output from the lifecycle_install tool.
#[derive(Debug, Clone, Serialize)]
pub struct InstallOutput {
    pub install: InstallReport,
    /// Present when install asked to skip waiting and activation ran.
    pub activation: Option<ActivateReport>,
    pub state: LifecycleState,
}

/// Output from the post_message tool.
#[derive(Debug, Clone, Serialize)]
pub struct PostMessageOutput {
    /// Whether the message triggered an activation.
    pub activated: bool,
    pub state: LifecycleState,
}

/// Parameters for the post_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PostMessageParams {
    /// Message payload as sent by the page.
    pub payload: serde_json::Value,
}

/// Install, then activate right away if install asked to skip waiting.
pub async fn install_impl(controller: &LifecycleController) -> Result<CallToolResult, McpError> {
    let (install, activation) = controller.on_install_then_activate().await?;
    let output = InstallOutput { install, activation, state: controller.state().await };
    json_result(&output)
}

pub async fn activate_impl(controller: &LifecycleController) -> Result<CallToolResult, McpError> {
    let report = controller.on_activate().await?;
    json_result(&report)
}

pub async fn post_message_impl(
    controller: &LifecycleController, params: PostMessageParams,
) -> Result<CallToolResult, McpError> {
    let activated = controller.on_message(&params.payload).await?;
    let output = PostMessageOutput { activated, state: controller.state().await };
    json_result(&output)
}
