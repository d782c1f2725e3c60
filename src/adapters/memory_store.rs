//! In-memory configuration store.
//!
//! Implements [`ConfigPort`] by keeping a postcard-encoded blob, the same
//! wire format a flash key/value partition would hold.  Used by the host
//! simulator and the tests; a board port would swap in a flash-backed
//! adapter implementing the same trait.

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::SystemConfig;
use crate::error::ConfigError;

/// Upper bound on an encoded configuration blob.
pub const MAX_BLOB_SIZE: usize = 512;

#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    blob: Option<Vec<u8>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a raw blob, e.g. one read back from another medium.
    pub fn with_blob(bytes: Vec<u8>) -> Self {
        Self { blob: Some(bytes) }
    }

    /// The encoded blob, if anything has been saved.
    pub fn blob(&self) -> Option<&[u8]> {
        self.blob.as_deref()
    }

    pub fn clear(&mut self) {
        self.blob = None;
    }
}

/// Decode and range-check a stored blob.
pub fn decode_config(bytes: &[u8]) -> Result<SystemConfig, ConfigError> {
    if bytes.is_empty() || bytes.len() > MAX_BLOB_SIZE {
        return Err(ConfigError::Corrupted);
    }
    let cfg: SystemConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
    cfg.validate()?;
    Ok(cfg)
}

impl ConfigPort for MemoryConfigStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        match &self.blob {
            Some(bytes) => {
                let cfg = decode_config(bytes)?;
                info!("MemoryConfigStore: loaded config ({} bytes)", bytes.len());
                Ok(cfg)
            }
            None => {
                info!("MemoryConfigStore: no stored config, using defaults");
                Ok(SystemConfig::default())
            }
        }
    }

    fn save(&mut self, config: &SystemConfig) -> Result<(), ConfigError> {
        if let Err(e) = config.validate() {
            warn!("MemoryConfigStore: refusing to save, {}", e);
            return Err(e);
        }
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::IoError);
        }
        self.blob = Some(bytes);
        info!("MemoryConfigStore: config saved");
        Ok(())
    }
}
