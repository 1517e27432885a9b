//! Transit request executor.
//!
//! Dispatches [`TransitRequest`]s through the routing table to the key policy
//! store and turns store results into client responses.

use std::sync::Arc;

use keyward_transit::KeyPolicyStore;
use keyward_transit::TransitError;
use keyward_transit::UpdateKeyConfigRequest;
use serde_json::Value;
use tracing::debug;
use tracing::warn;

use crate::fields::update_key_config_from_json;
use crate::router::Method;
use crate::router::RouteTable;
use crate::types::KeyConfigResultResponse;
use crate::types::KeyConfigView;
use crate::types::TransitRequest;
use crate::types::TransitResponse;

/// Executes transit requests against a key policy store.
pub struct TransitExecutor {
    store: Arc<dyn KeyPolicyStore>,
    routes: RouteTable,
}

impl TransitExecutor {
    /// Create an executor with the standard transit routes.
    pub fn new(store: Arc<dyn KeyPolicyStore>) -> Self {
        Self::with_routes(store, RouteTable::transit())
    }

    /// Create an executor with a custom routing table.
    pub fn with_routes(store: Arc<dyn KeyPolicyStore>, routes: RouteTable) -> Self {
        Self { store, routes }
    }

    /// Service name for logging.
    pub fn service_name(&self) -> &'static str {
        "transit"
    }

    /// Operation names this executor handles.
    pub fn handles(&self) -> Vec<&'static str> {
        self.routes.handles()
    }

    /// Execute a typed request.
    ///
    /// # Errors
    ///
    /// Returns an error only if the request's operation is not routed.
    /// Store failures are reported inside the response.
    pub async fn execute(&self, request: TransitRequest) -> anyhow::Result<TransitResponse> {
        let operation = request.operation();
        if self.routes.route_for(operation).is_none() {
            anyhow::bail!("operation {operation} is not routed by the {} service", self.service_name());
        }

        match request {
            TransitRequest::TransitUpdateKeyConfig {
                name,
                min_decryption_version,
                deletion_allowed,
            } => {
                let request = UpdateKeyConfigRequest {
                    name,
                    min_decryption_version,
                    deletion_allowed,
                };
                Ok(self.handle_update_key_config(request).await)
            }
            TransitRequest::TransitReadKeyConfig { name } => Ok(self.handle_read_key_config(name).await),
        }
    }

    /// Execute a request addressed by method and path with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if no route matches. Malformed fields are reported
    /// as an invalid-request response.
    pub async fn execute_path(&self, method: Method, path: &str, body: &Value) -> anyhow::Result<TransitResponse> {
        let Some(resolved) = self.routes.resolve(method, path) else {
            anyhow::bail!("no route for {method:?} {path}");
        };

        let request = match resolved.route.method {
            Method::Update => match update_key_config_from_json(&resolved.name, body) {
                Ok(request) => TransitRequest::TransitUpdateKeyConfig {
                    name: request.name,
                    min_decryption_version: request.min_decryption_version,
                    deletion_allowed: request.deletion_allowed,
                },
                Err(e) => {
                    warn!(path = %path, error = %e, "Rejected transit request fields");
                    return Ok(failure_response(&e));
                }
            },
            Method::Read => TransitRequest::TransitReadKeyConfig { name: resolved.name },
        };

        self.execute(request).await
    }

    async fn handle_update_key_config(&self, request: UpdateKeyConfigRequest) -> TransitResponse {
        debug!(
            name = %request.name,
            min_decryption_version = ?request.min_decryption_version,
            deletion_allowed = ?request.deletion_allowed,
            "Transit update key config request"
        );

        match self.store.update_key_config(request).await {
            Ok(Some(response)) => TransitResponse::KeyConfigResult(KeyConfigResultResponse::success(
                KeyConfigView::from(&response.policy),
                response.warnings,
            )),
            Ok(None) => TransitResponse::NoContent,
            Err(e) => {
                warn!(error = %e, "Transit update key config failed");
                failure_response(&e)
            }
        }
    }

    async fn handle_read_key_config(&self, name: String) -> TransitResponse {
        debug!(name = %name, "Transit read key config request");

        match self.store.read_key_config(&name).await {
            Ok(Some(policy)) => TransitResponse::KeyConfigResult(KeyConfigResultResponse::success(
                KeyConfigView::from(&policy),
                Vec::new(),
            )),
            Ok(None) => failure_response(&TransitError::KeyNotFound { name }),
            Err(e) => {
                warn!(error = %e, "Transit read key config failed");
                failure_response(&e)
            }
        }
    }
}

fn failure_response(error: &TransitError) -> TransitResponse {
    TransitResponse::KeyConfigResult(KeyConfigResultResponse::failure(
        sanitize_transit_error(error),
        error.is_invalid_request(),
    ))
}

/// Sanitize transit errors for client display.
///
/// Invalid-request errors keep their message; internal errors are reduced to
/// a generic message so storage details don't leak.
pub fn sanitize_transit_error(error: &TransitError) -> String {
    if error.is_invalid_request() {
        error.to_string()
    } else {
        "internal transit error".to_string()
    }
}
