//! validate
//!
//! Rule-based acceptance of candidate configurations.
//!
//! # Architecture
//!
//! A candidate arrives as a whole document, is read into the typed
//! [`model::CandidateConfig`], and runs through the rule table in
//! declaration order. The first violated rule rejects the candidate with
//! its message and later rules never run. An accepted candidate yields the
//! package dependencies implied by its backend selection.
//!
//! # Invariants
//!
//! - Rules are pure. Evaluation never touches the document.
//! - Rejection messages are stable user-facing strings; the host displays
//!   them verbatim.

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::core::document::Document;

pub mod model;

pub use model::{BitcoinBackend, CandidateConfig, TorConfig};

/// Packages the accepted configuration requires, with per-package health
/// checks the host should enforce. Flag lists are empty today.
pub type DependencyMap = IndexMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum ValidateError {
    /// The candidate does not deserialize into the expected structure.
    #[error("malformed candidate configuration: {0}")]
    Malformed(#[from] serde_yaml::Error),
    /// A rule rejected the candidate. The message stands on its own.
    #[error("{0}")]
    Rejected(&'static str),
}

struct Rule {
    message: &'static str,
    satisfied: fn(&CandidateConfig) -> bool,
}

const RULES: &[Rule] = &[
    Rule {
        message: "Maximum Channel Size must exceed Minimum Channel Size",
        satisfied: channel_sizes_ordered,
    },
    Rule {
        message: "'Tor Config > Use Tor Only' must be enabled to enable 'Tor Config > Stream Isolation'",
        satisfied: stream_isolation_covered,
    },
];

fn channel_sizes_ordered(config: &CandidateConfig) -> bool {
    match (config.min_chan_size, config.max_chan_size) {
        (Some(min), Some(max)) => max > min,
        _ => true,
    }
}

fn stream_isolation_covered(config: &CandidateConfig) -> bool {
    !config.tor.stream_isolation || config.tor.use_tor_only
}

/// Outcome of accepting a candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validated {
    #[serde(rename = "depends-on")]
    pub depends_on: DependencyMap,
}

/// The packages each backend choice pulls in.
pub fn derive_dependencies(backend: BitcoinBackend) -> DependencyMap {
    match backend {
        BitcoinBackend::None => IndexMap::new(),
        BitcoinBackend::Internal => IndexMap::from([("bitcoind".to_string(), Vec::new())]),
        BitcoinBackend::InternalProxy => {
            IndexMap::from([("btc-rpc-proxy".to_string(), Vec::new())])
        }
    }
}

/// Accept or reject a fully populated candidate document.
pub fn validate(candidate: &Document) -> Result<Validated, ValidateError> {
    let config: CandidateConfig =
        serde_yaml::from_value(serde_yaml::Value::from(candidate.clone()))?;
    for rule in RULES {
        if !(rule.satisfied)(&config) {
            return Err(ValidateError::Rejected(rule.message));
        }
    }
    Ok(Validated {
        depends_on: derive_dependencies(config.bitcoind),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> Document {
        Document::from_yaml(yaml).expect("fixture parses")
    }

    fn accepted(yaml: &str) -> Validated {
        validate(&doc(yaml)).expect("candidate accepted")
    }

    fn rejected(yaml: &str) -> String {
        match validate(&doc(yaml)) {
            Err(ValidateError::Rejected(message)) => message.to_string(),
            other => panic!("expected a rule rejection, got {other:?}"),
        }
    }

    mod channel_sizes {
        use super::*;

        #[test]
        fn inverted_bounds_are_rejected() {
            let message = rejected(
                "min-chan-size: 20000\nmax-chan-size: 1000\ntor: {}\nbitcoind:\n  type: none\n",
            );
            assert_eq!(message, "Maximum Channel Size must exceed Minimum Channel Size");
        }

        #[test]
        fn equal_bounds_are_rejected() {
            rejected("min-chan-size: 5000\nmax-chan-size: 5000\ntor: {}\nbitcoind:\n  type: none\n");
        }

        #[test]
        fn an_unset_bound_skips_the_rule() {
            accepted("max-chan-size: 1000\ntor: {}\nbitcoind:\n  type: none\n");
            accepted("min-chan-size: 20000\ntor: {}\nbitcoind:\n  type: none\n");
            accepted("min-chan-size: null\nmax-chan-size: 1000\ntor: {}\nbitcoind:\n  type: none\n");
        }

        #[test]
        fn ordered_bounds_pass() {
            accepted("min-chan-size: 1000\nmax-chan-size: 20000\ntor: {}\nbitcoind:\n  type: none\n");
        }
    }

    mod stream_isolation {
        use super::*;

        #[test]
        fn isolation_without_tor_only_is_rejected() {
            let message = rejected(
                "tor:\n  use-tor-only: false\n  stream-isolation: true\nbitcoind:\n  type: none\n",
            );
            assert_eq!(
                message,
                "'Tor Config > Use Tor Only' must be enabled to enable 'Tor Config > Stream Isolation'"
            );
        }

        #[test]
        fn isolation_with_tor_only_passes() {
            accepted(
                "tor:\n  use-tor-only: true\n  stream-isolation: true\nbitcoind:\n  type: none\n",
            );
        }

        #[test]
        fn stripped_tor_section_passes() {
            accepted("tor: {}\nbitcoind:\n  type: none\n");
        }
    }

    #[test]
    fn first_violated_rule_wins() {
        let message = rejected(
            "min-chan-size: 20000\n\
             max-chan-size: 1000\n\
             tor:\n  use-tor-only: false\n  stream-isolation: true\n\
             bitcoind:\n  type: none\n",
        );
        assert_eq!(message, "Maximum Channel Size must exceed Minimum Channel Size");
    }

    mod dependencies {
        use super::*;

        #[test]
        fn neutrino_needs_no_packages() {
            let outcome = accepted("tor: {}\nbitcoind:\n  type: none\n");
            assert!(outcome.depends_on.is_empty());
        }

        #[test]
        fn internal_backend_needs_bitcoind() {
            let outcome = accepted("tor: {}\nbitcoind:\n  type: internal\n");
            assert_eq!(outcome.depends_on.get("bitcoind"), Some(&Vec::new()));
            assert_eq!(outcome.depends_on.len(), 1);
        }

        #[test]
        fn proxy_backend_needs_the_proxy_package() {
            let outcome = accepted("tor: {}\nbitcoind:\n  type: internal-proxy\n");
            assert_eq!(outcome.depends_on.get("btc-rpc-proxy"), Some(&Vec::new()));
            assert_eq!(outcome.depends_on.len(), 1);
        }

        #[test]
        fn dependency_payload_serializes_with_the_wire_key() {
            let outcome = accepted("tor: {}\nbitcoind:\n  type: internal\n");
            let json = serde_json::to_string(&outcome).expect("serialize");
            assert_eq!(json, r#"{"depends-on":{"bitcoind":[]}}"#);
        }
    }

    #[test]
    fn malformed_candidate_reports_the_decode_failure() {
        let err = validate(&doc("tor: {}\nbitcoind:\n  type: external\n"))
            .expect_err("unknown backend");
        assert!(matches!(err, ValidateError::Malformed(_)));
        assert!(err.to_string().contains("malformed candidate configuration"));
    }
}
