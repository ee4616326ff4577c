/// Challenge content retrieval from the content service.
pub mod content;
/// Database model definitions.
pub mod models;
/// Room and profile storage and retrieval operations.
pub mod room_store;
/// Storage abstraction layer for database operations.
pub mod storage;
