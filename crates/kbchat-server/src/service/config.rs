use std::path::{Path, PathBuf};

#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use kbchat_rig::{RigConfig, RigService};
use serde::{Deserialize, Serialize};

use crate::service::{Error, Result};

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ServiceConfig {
    /// Chat, knowledge-base and session configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    pub rig: RigConfig,

    /// Directory with a browser client served for unmatched paths.
    #[cfg_attr(feature = "config", arg(long, env = "PUBLIC_DIR"))]
    #[builder(default)]
    pub public_dir: Option<PathBuf>,
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Connects the model provider and indexes the knowledge base.
    pub async fn connect_rig(&self) -> Result<RigService> {
        RigService::new(&self.rig).await.map_err(Error::from)
    }

    /// Returns the static asset directory, if one exists on disk.
    pub fn public_dir(&self) -> Option<&Path> {
        self.public_dir.as_deref().filter(|dir| dir.is_dir())
    }
}

impl ServiceConfigBuilder {
    fn validate(builder: &ServiceConfigBuilder) -> Result<(), String> {
        if let Some(rig) = &builder.rig {
            rig.validate().map_err(|e| e.to_string())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_validates_rig_config() {
        let config = RigConfig {
            chunk_overlap: 2048,
            ..RigConfig::new("key")
        };

        assert!(ServiceConfig::builder().with_rig(config).build().is_err());
    }

    #[test]
    fn missing_public_dir_is_ignored() {
        let config = ServiceConfig::builder()
            .with_rig(RigConfig::new("key"))
            .with_public_dir("./does-not-exist")
            .build()
            .expect("config builds");

        assert!(config.public_dir().is_none());
    }

    #[test]
    fn existing_public_dir_is_served() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ServiceConfig::builder()
            .with_rig(RigConfig::new("key"))
            .with_public_dir(dir.path())
            .build()
            .expect("config builds");

        assert_eq!(config.public_dir(), Some(dir.path()));
    }
}
