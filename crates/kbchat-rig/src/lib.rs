#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod chat;
mod error;
pub mod provider;
pub mod rag;
mod service;
pub mod session;

pub use error::{Error, Result};
pub use service::{RigConfig, RigService};

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "kbchat_rig";
