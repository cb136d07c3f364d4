//! Integration tests for the cvo binary.
//!
//! These tests exercise the compiled CLI end to end: every line on stdout
//! is a machine-readable envelope (or the dry-run summary), human
//! diagnostics go to stderr, and exit codes follow the envelope kind.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use carryover::store::{FileStore, StoreLock};

// =============================================================================
// Test Fixtures
// =============================================================================

/// Get a command for running cvo.
fn cvo() -> Command {
    Command::cargo_bin("cvo").unwrap()
}

/// A seeded config.yaml inside its own temporary directory.
struct ConfigFile {
    dir: TempDir,
}

impl ConfigFile {
    fn new(yaml: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        fs::write(dir.path().join("config.yaml"), yaml).expect("seed config");
        Self { dir }
    }

    fn path(&self) -> PathBuf {
        self.dir.path().join("config.yaml")
    }

    fn raw(&self) -> String {
        fs::read_to_string(self.path()).expect("read config")
    }
}

/// A document with everything the current release requires, as an old
/// release would have stored it.
const COMPLETE_LEGACY: &str = "\
color: ffffff
accept-keysend: true
accept-amp: false
reject-htlc: false
tor:
  use-tor-only: true
  stream-isolation: true
bitcoind:
  type: none
autopilot:
  enabled: false
advanced:
  debug-level: info
";

#[test]
fn version_flag_works() {
    cvo()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cvo"));
}

#[test]
fn help_flag_works() {
    cvo()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("version-gated migration"));
}

// =============================================================================
// migrate
// =============================================================================

mod migrate_cmd {
    use super::*;

    #[test]
    fn upgrading_a_complete_document_reports_configured() {
        let config = ConfigFile::new(COMPLETE_LEGACY);

        cvo()
            .args(["migrate", "--from", "0.13.3", "--config"])
            .arg(config.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"result":{"configured":true}}"#));

        assert!(config.raw().contains("internal-proxy"));
    }

    #[test]
    fn upgrading_a_sparse_document_reports_not_configured() {
        let config = ConfigFile::new("bitcoind:\n  type: none\ntor: {}\n");

        cvo()
            .args(["migrate", "--from", "0.13.3", "--config"])
            .arg(config.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"result":{"configured":false}}"#));

        // The rewrite itself still happened.
        assert!(config.raw().contains("internal-proxy"));
    }

    #[test]
    fn an_explicit_target_skips_the_current_contract() {
        let config = ConfigFile::new("bitcoind:\n  type: none\ntor: {}\n");

        cvo()
            .args(["migrate", "--from", "0.13.3", "--to", "0.14.3", "--config"])
            .arg(config.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"result":{"configured":true}}"#));
    }

    #[test]
    fn dry_run_prints_the_chain_and_leaves_the_file_alone() {
        let config = ConfigFile::new(COMPLETE_LEGACY);
        let before = config.raw();

        cvo()
            .args(["migrate", "--from", "0.13.3", "--dry-run", "--config"])
            .arg(config.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("cross 0.13.3.2 (upgrade)"))
            .stdout(predicate::str::contains("\"result\"").not());

        assert_eq!(config.raw(), before);
    }

    #[test]
    fn terminal_downgrade_fails_with_an_error_envelope() {
        let config = ConfigFile::new("bitcoind:\n  type: internal-proxy\ntor: {}\n");
        let before = config.raw();

        cvo()
            .args(["migrate", "--from", "0.15.4.1", "--to", "0.14.3", "--config"])
            .arg(config.path())
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#"{"error":"#))
            .stdout(predicate::str::contains("cannot downgrade across 0.15.0"));

        assert_eq!(config.raw(), before);
    }

    #[test]
    fn a_corrupt_document_fails_with_an_error_envelope() {
        let config = ConfigFile::new("alias: my-node\n");

        cvo()
            .args(["migrate", "--from", "0.13.3", "--config"])
            .arg(config.path())
            .assert()
            .code(1)
            .stdout(predicate::str::contains("refusing to migrate a corrupt document"));
    }

    #[test]
    fn a_missing_file_fails_with_an_error_envelope() {
        let dir = TempDir::new().expect("create temp dir");

        cvo()
            .args(["migrate", "--from", "0.13.3", "--config"])
            .arg(dir.path().join("config.yaml"))
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#"{"error":"#));
    }

    #[test]
    fn a_held_lock_turns_the_run_away() {
        let config = ConfigFile::new(COMPLETE_LEGACY);
        let lock_path = FileStore::new(config.path()).lock_path();
        let _held = StoreLock::acquire(&lock_path).expect("acquire lock");

        cvo()
            .args(["migrate", "--from", "0.13.3", "--config"])
            .arg(config.path())
            .assert()
            .code(1)
            .stdout(predicate::str::contains("locked by another migration process"));
    }
}

// =============================================================================
// check
// =============================================================================

mod check_cmd {
    use super::*;

    #[test]
    fn an_acceptable_candidate_yields_its_dependencies() {
        cvo()
            .arg("check")
            .write_stdin(
                "max-chan-size: 16777215\n\
                 tor:\n  use-tor-only: true\n  stream-isolation: true\n\
                 bitcoind:\n  type: internal-proxy\n  user: lnd\n  password: secret\n",
            )
            .assert()
            .success()
            .stdout(predicate::str::contains(
                r#"{"result":{"depends-on":{"btc-rpc-proxy":[]}}}"#,
            ));
    }

    #[test]
    fn equal_channel_bounds_are_rejected_with_the_rule_message() {
        cvo()
            .arg("check")
            .write_stdin(
                "min-chan-size: 100000\nmax-chan-size: 100000\n\
                 tor: {}\nbitcoind:\n  type: none\n",
            )
            .assert()
            .success()
            .stdout(predicate::str::contains(
                r#"{"error":"Maximum Channel Size must exceed Minimum Channel Size"}"#,
            ));
    }

    #[test]
    fn uncovered_stream_isolation_is_rejected_with_the_rule_message() {
        cvo()
            .arg("check")
            .write_stdin("tor:\n  stream-isolation: true\nbitcoind:\n  type: none\n")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "'Tor Config > Use Tor Only' must be enabled",
            ));
    }

    #[test]
    fn an_unparseable_candidate_is_a_rejection_not_a_crash() {
        cvo()
            .arg("check")
            .write_stdin("not: [valid\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("malformed candidate configuration"));
    }

    #[test]
    fn a_candidate_missing_its_tor_section_is_malformed() {
        cvo()
            .arg("check")
            .write_stdin("bitcoind:\n  type: none\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("malformed candidate configuration"));
    }

    #[test]
    fn a_candidate_file_is_read_like_stdin() {
        let config = ConfigFile::new("tor: {}\nbitcoind:\n  type: internal\n");

        cvo()
            .arg("check")
            .arg(config.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(
                r#"{"result":{"depends-on":{"bitcoind":[]}}}"#,
            ));
    }

    #[test]
    fn an_unreadable_candidate_file_is_an_environment_failure() {
        let dir = TempDir::new().expect("create temp dir");

        cvo()
            .arg("check")
            .arg(dir.path().join("missing.yaml"))
            .assert()
            .code(1)
            .stderr(predicate::str::contains("error:"));
    }
}

// =============================================================================
// schema and completion
// =============================================================================

mod schema_cmd {
    use super::*;

    #[test]
    fn schema_prints_the_current_contract() {
        cvo()
            .arg("schema")
            .assert()
            .success()
            .stdout(predicate::str::contains("control-tor-address"))
            .stdout(predicate::str::contains("internal-proxy"))
            .stdout(predicate::str::contains("Bitcoin Proxy"));
    }
}

mod completion_cmd {
    use super::*;

    #[test]
    fn bash_completion_mentions_the_binary() {
        cvo()
            .args(["completion", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cvo"));
    }
}
