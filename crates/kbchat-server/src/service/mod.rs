//! Application state and dependency injection.

mod config;

use kbchat_rig::RigService;
use kbchat_rig::chat::ChatService;

pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub rig: RigService,
}

impl ServiceState {
    /// Creates application state around an initialized rig service.
    pub fn new(rig: RigService) -> Self {
        Self { rig }
    }

    /// Initializes application state from configuration.
    ///
    /// Connects the model provider and indexes the knowledge base.
    pub async fn from_config(service_config: &ServiceConfig) -> Result<Self> {
        let rig = service_config.connect_rig().await?;
        Ok(Self::new(rig))
    }
}

impl axum::extract::FromRef<ServiceState> for RigService {
    fn from_ref(state: &ServiceState) -> Self {
        state.rig.clone()
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.rig.$f().clone()
            }
        }
    )+};
}

impl_di!(chat: ChatService);
