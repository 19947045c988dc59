//! Service layer for tabletalk
//!
//! Centralizes business logic between the HTTP handlers and the
//! retrieval/generation/execution crates.

mod chat_service;
mod error;
mod prompt;
mod schema_service;
mod session_store;

pub use chat_service::{ChatReply, ChatService};
pub use error::ServiceError;
pub use prompt::PromptAssembler;
pub use schema_service::SchemaService;
pub use session_store::{SessionStore, SessionSummary};
