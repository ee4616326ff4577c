/// Challenge classification, dispatch, and resolution timers.
pub mod challenge_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Host failover: grace window, reclaim, and promotion.
pub mod failover;
/// Health check service.
pub mod health_service;
/// Player profile lookups and lazy initialisation.
pub mod profile_service;
/// Room lifecycle and membership logic.
pub mod room_service;
/// Host-managed key ledger.
pub mod score_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage supervision with reconnect backoff.
pub mod storage_supervisor;
