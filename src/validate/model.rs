//! validate::model
//!
//! Typed view of a candidate configuration. Only the slices the rules and
//! the dependency derivation read are modeled; any other content in the
//! candidate is tolerated and passes through untouched.

use serde::Deserialize;

/// The part of a candidate document the validator reasons about.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CandidateConfig {
    #[serde(default)]
    pub min_chan_size: Option<u64>,
    #[serde(default)]
    pub max_chan_size: Option<u64>,
    pub tor: TorConfig,
    pub bitcoind: BitcoinBackend,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TorConfig {
    #[serde(default)]
    pub use_tor_only: bool,
    #[serde(default)]
    pub stream_isolation: bool,
}

/// Backend selector. Variant payloads are host-injected credentials, so
/// only the chosen variant matters here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "kebab-case")]
pub enum BitcoinBackend {
    None,
    Internal,
    InternalProxy,
}

impl BitcoinBackend {
    pub fn discriminator(&self) -> &'static str {
        match self {
            BitcoinBackend::None => "none",
            BitcoinBackend::Internal => "internal",
            BitcoinBackend::InternalProxy => "internal-proxy",
        }
    }
}
