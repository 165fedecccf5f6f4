//! intercept_fetch tool implementation.
//!
//! Offers one page request to the controller and reports how it was served.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::{FetchOutcome, LifecycleController, ResponseSource, RoutingPolicy};
use swcache_core::{Destination, Error, Request};
use url::Url;

use super::json_result;

/// Input parameters for intercept_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InterceptParams {
    /// Absolute URL of the request.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Fetch destination hint: document, image, style, script, font, manifest.
    #[serde(default)]
    pub destination: Destination,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for intercept_fetch tool.
#[derive(Debug, Clone, Serialize)]
pub struct InterceptOutput {
    /// False when the request was declined and should go to the network untouched.
    pub handled: bool,
    pub policy: RoutingPolicy,
    pub source: Option<ResponseSource>,
    pub status: Option<u16>,
    pub headers: BTreeMap<String, String>,
    /// Body decoded as UTF-8 (lossy).
    pub body: Option<String>,
    /// Whether a background refresh was started.
    pub revalidating: bool,
}

pub async fn intercept_impl(controller: &LifecycleController, params: InterceptParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }
    let url = Url::parse(params.url.trim()).map_err(|e| Error::InvalidUrl(format!("{}: {e}", params.url)))?;
    let request = Request::new(&params.method, url).with_destination(params.destination);

    let output = match controller.handle_fetch(&request).await? {
        FetchOutcome::Respond { policy, served } => InterceptOutput {
            handled: true,
            policy,
            source: Some(served.source),
            status: Some(served.response.status),
            body: Some(served.response.text()),
            headers: served.response.headers,
            revalidating: served.revalidation.is_some(),
        },
        FetchOutcome::Decline => InterceptOutput {
            handled: false,
            policy: controller.classifier().classify(&request),
            source: None,
            status: None,
            headers: BTreeMap::new(),
            body: None,
            revalidating: false,
        },
    };

    json_result(&output)
}
