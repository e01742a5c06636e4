/// OpenAPI documentation generation.
pub mod documentation;
/// Game store mutations and projections.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Press-and-hold gesture runtime.
pub mod hold_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// WebSocket zone input handling.
pub mod websocket_service;
