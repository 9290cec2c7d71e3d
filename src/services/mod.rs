/// OpenAPI documentation generation.
pub mod documentation;
/// Scorecard lifecycle: list, fetch, create, delete and hole updates.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Background storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
