use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status ("ok" or "degraded").
    pub status: &'static str,
    /// Whether the last storage health check succeeded.
    pub storage_reachable: bool,
}

impl HealthResponse {
    /// Build the response from the degraded flag and the storage health check outcome.
    pub fn new(degraded: bool, storage_reachable: bool) -> Self {
        let status = if degraded || !storage_reachable {
            "degraded"
        } else {
            "ok"
        };
        Self {
            status,
            storage_reachable,
        }
    }
}
