//! Request extractors with improved error handling.
//!
//! - [`Json`] - JSON deserialization rendered as a JSON [`ErrorResponse`] on failure
//! - [`Path`] - Path parameter extraction with detailed error context
//!
//! [`ErrorResponse`]: crate::handler::ErrorResponse

pub mod reject;

pub use crate::extract::reject::{Json, Path};
