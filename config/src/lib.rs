// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! digminer Configuration
//!
//! This crate loads the miner's JSON configuration file. The document keeps
//! its settings under a top-level `config` key whose `cleos` object names
//! the chain account, the wallet credentials, and the external `cleos`
//! binary to shell out to:
//!
//! ```json
//! {
//!   "config": {
//!     "cleos": {
//!       "account": "alice",
//!       "wallet_name": "default",
//!       "wallet_password": "PW5...",
//!       "cleos_path": "/usr/local/bin/cleos",
//!       "api_url": "http://127.0.0.1:8888",
//!       "verbose_errors": false
//!     }
//!   }
//! }
//! ```
//!
//! Configuration is loaded once at startup and never mutated. Any read or
//! parse failure is fatal to the caller; there is no partial-success path
//! and no fallback document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the JSON configuration document
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Main configuration structure, the value under the document's `config` key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerConfig {
    /// Settings for driving the external cleos binary
    pub cleos: CleosConfig,
}

/// Account, wallet, and endpoint settings for the cleos subprocess calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleosConfig {
    /// Chain account that signs mine actions and collects the reward
    pub account: String,
    /// Name of the wallet holding the account's active key
    pub wallet_name: String,
    /// Password used to unlock that wallet at startup
    pub wallet_password: String,
    /// Path to the cleos executable
    pub cleos_path: PathBuf,
    /// HTTP endpoint of the chain API node, passed to cleos as `--url`
    pub api_url: String,
    /// Surface per-action subprocess failures in the log
    pub verbose_errors: bool,
}

/// On-disk envelope: everything sits under a `config` key.
#[derive(Debug, Deserialize)]
struct ConfigDocument {
    config: MinerConfig,
}

impl MinerConfig {
    /// Load configuration from the JSON document at `path`.
    ///
    /// Missing fields and type mismatches are parse errors: the whole
    /// document must be well-formed before the miner starts, so a bad
    /// credential key fails here rather than on the first wallet call.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let document: ConfigDocument = serde_json::from_str(&contents)?;
        Ok(document.config)
    }
}
