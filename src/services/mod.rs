/// Match commands and data entry for operators.
pub mod admin_service;
/// Admin authorization and identity sync.
pub mod auth_service;
/// Periodic board refresh and clock ticks.
pub mod board_supervisor;
/// OpenAPI documentation generation.
pub mod documentation;
/// Goal form resolution into backend score payloads.
pub mod goal_attribution;
/// Health check service.
pub mod health_service;
/// Read-only projections for viewers.
pub mod public_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events subscription and streaming.
pub mod sse_service;
