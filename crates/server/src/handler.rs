//! MCP server handler implementation.
//!
//! Plays the host platform for one controller: lifecycle events, page
//! messages and intercepted requests arrive as tool calls.
use std::sync::Arc;

use crate::tools::clients::ClaimLog;
use crate::tools::intercept::{InterceptParams, intercept_impl};
use crate::tools::lifecycle::{PostMessageParams, activate_impl, install_impl, post_message_impl};
use crate::tools::status::status_impl;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use swcache_client::{Fetcher, LifecycleController};
use swcache_core::{AppConfig, CacheDb, Error};

/// The main MCP server handler for sw-cache.
#[derive(Clone)]
pub struct SwCacheServer {
    tool_router: ToolRouter<Self>,
    controller: Arc<LifecycleController>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl SwCacheServer {
    /// Create a new server handler around a controller for the configured version.
    pub fn new(config: &AppConfig, db: CacheDb, fetcher: Arc<dyn Fetcher>) -> Result<Self, Error> {
        let controller = LifecycleController::new(config, db, fetcher, Arc::new(ClaimLog::default()))?;
        Ok(Self { tool_router: Self::tool_router(), controller: Arc::new(controller) })
    }

    /// Run the install step: open the current store and precache the manifest.
    #[tool(
        description = "Install this version: create its cache store and precache the manifest (best-effort). Activates immediately when skip-waiting is enabled."
    )]
    async fn lifecycle_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.controller).await
    }

    /// Run the activate step: purge old-version stores and claim clients.
    #[tool(description = "Activate this version: delete every cache store from other versions and claim open pages.")]
    async fn lifecycle_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.controller).await
    }

    /// Deliver a message from a page.
    #[tool(
        description = "Deliver a page message. {\"type\": \"SKIP_WAITING\"} activates a waiting version; other payloads are ignored."
    )]
    async fn post_message(&self, params: Parameters<PostMessageParams>) -> Result<CallToolResult, McpError> {
        post_message_impl(&self.controller, params.0).await
    }

    /// Offer a request for interception.
    #[tool(
        description = "Offer a page request to the cache. Returns the routing policy and the response, or handled=false when the request should go straight to the network."
    )]
    async fn intercept_fetch(&self, params: Parameters<InterceptParams>) -> Result<CallToolResult, McpError> {
        intercept_impl(&self.controller, params.0).await
    }

    /// Report lifecycle state and stores.
    #[tool(description = "Report lifecycle state, the current store name, every store on disk and the current entry count.")]
    async fn cache_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.controller).await
    }
}

impl ServerHandler for SwCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "sw-cache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
