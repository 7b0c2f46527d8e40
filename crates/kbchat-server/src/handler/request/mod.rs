//! Request types for HTTP handlers.

mod chat;
mod paths;

pub use chat::ChatRequest;
pub use paths::SessionPathParams;
