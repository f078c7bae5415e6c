//! CLI integration tests for the rootstrap steps.
//!
//! Each test uses an isolated temp directory for the database, ensuring tests
//! can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_fs::TempDir;
use predicates::prelude::*;
use rootstrap::auth::SecretHasher;
use rootstrap::config::RootAccount;
use rootstrap::store::{SqliteStore, Store, WriteMode};

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn data_dir_str(&self) -> String {
        self.data_dir().to_string_lossy().to_string()
    }

    fn password_file(&self) -> PathBuf {
        self.data_dir().join("initial_root_password")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("rootstrap").expect("failed to find binary");
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("ROOTSTRAP_PASSWORD");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    fn init(&self) -> assert_cmd::assert::Assert {
        self.cmd()
            .args(["init", "--data-dir", &self.data_dir_str()])
            .assert()
    }

    fn setup_root(&self) -> assert_cmd::assert::Assert {
        self.setup_root_cmd().assert()
    }

    fn setup_root_cmd(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.args([
            "setup-root",
            "--data-dir",
            &self.data_dir_str(),
            "--password-file",
            &self.password_file().to_string_lossy(),
        ]);
        cmd
    }

    fn issue_token(&self, prefix: &str, scopes: &str) -> assert_cmd::assert::Assert {
        self.cmd()
            .args(["issue-token", prefix, scopes, "--data-dir", &self.data_dir_str()])
            .assert()
    }

    fn fix_sequences(&self) -> assert_cmd::assert::Assert {
        self.cmd()
            .args(["fix-sequences", "--data-dir", &self.data_dir_str()])
            .assert()
    }

    fn verify_namespace(&self) -> assert_cmd::assert::Assert {
        self.cmd()
            .args(["verify-namespace", "--data-dir", &self.data_dir_str()])
            .assert()
    }

    fn open_store(&self) -> SqliteStore {
        SqliteStore::new(self.data_dir().join("rootstrap.db")).expect("open store")
    }
}

fn stdout_lines(assert: &assert_cmd::assert::Assert) -> Vec<String> {
    String::from_utf8_lossy(&assert.get_output().stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

fn root_user_id(store: &SqliteStore) -> i64 {
    store
        .get_user_by_username("root")
        .expect("query user")
        .expect("root user missing")
        .id
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn init_creates_database_file() {
    let ctx = TestContext::new();

    ctx.init()
        .success()
        .stdout(predicate::str::contains("Database initialized"));

    assert!(ctx.data_dir().join("rootstrap.db").exists());
}

#[test]
fn init_twice_keeps_existing_rows() {
    let ctx = TestContext::new();
    ctx.init().success();
    ctx.setup_root().success();

    ctx.init().success();

    let store = ctx.open_store();
    assert_eq!(root_user_id(&store), 1);
}

#[test]
fn steps_refuse_to_run_without_database() {
    let ctx = TestContext::new();

    ctx.verify_namespace()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("rootstrap init"));
    ctx.fix_sequences().failure().code(1);

    assert!(!ctx.data_dir().join("rootstrap.db").exists());
}

// ============================================================================
// Token issuance
// ============================================================================

#[test]
fn issue_token_without_arguments_prints_usage_to_stderr() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.cmd()
        .args(["issue-token", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn issue_token_with_one_argument_prints_usage_to_stderr() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.cmd()
        .args(["issue-token", "automation-token", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn issue_token_requires_root_account() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.issue_token("automation-token", "api")
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("account 'root' not found"));
}

#[test]
fn issue_token_prints_single_token_line() {
    let ctx = TestContext::new();
    ctx.init().success();
    ctx.setup_root().success();

    let assert = ctx
        .issue_token("automation-token", "api,write_repository")
        .success();

    let lines = stdout_lines(&assert);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("rst_"));

    let store = ctx.open_store();
    let tokens = store
        .list_user_tokens(root_user_id(&store))
        .expect("list tokens");
    assert_eq!(tokens.len(), 1);

    let suffix = tokens[0]
        .name
        .strip_prefix("automation-token-")
        .expect("name carries prefix");
    assert!(suffix.parse::<i64>().is_ok());
    assert_eq!(tokens[0].scopes.to_strings(), vec!["api", "write_repository"]);
}

#[test]
fn issue_token_twice_yields_distinct_tokens() {
    let ctx = TestContext::new();
    ctx.init().success();
    ctx.setup_root().success();

    let first = stdout_lines(&ctx.issue_token("automation-token", "api").success());
    let second = stdout_lines(&ctx.issue_token("automation-token", "api").success());

    assert_ne!(first, second);

    let store = ctx.open_store();
    assert_eq!(store.list_user_tokens(root_user_id(&store)).unwrap().len(), 2);
}

#[test]
fn issue_token_reports_validation_errors() {
    let ctx = TestContext::new();
    ctx.init().success();
    ctx.setup_root().success();

    ctx.issue_token("automation-token", "api,bogus")
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Token creation failed:"))
        .stderr(predicate::str::contains("Error: Token creation failed").not())
        .stderr(predicate::str::contains("bogus"));

    let store = ctx.open_store();
    assert!(store.list_user_tokens(root_user_id(&store)).unwrap().is_empty());
}

// ============================================================================
// Sequence repair
// ============================================================================

#[test]
fn fix_sequences_skips_empty_tables() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.fix_sequences()
        .success()
        .stdout(predicate::str::contains("Fixed").not())
        .stdout(predicate::str::contains("Database sequences initialized"));
}

#[test]
fn fix_sequences_repairs_drift_from_pinned_ids() {
    let ctx = TestContext::new();
    ctx.init().success();
    ctx.setup_root().success();

    let assert = ctx.fix_sequences().success();

    assert_eq!(
        stdout_lines(&assert),
        vec![
            "Fixed namespaces_id_seq (set to 2)",
            "Fixed users_id_seq (set to 2)",
            "Database sequences initialized",
        ]
    );

    let store = ctx.open_store();
    assert_eq!(store.sequence_value("users_id_seq").unwrap(), 2);
    assert_eq!(store.sequence_value("projects_id_seq").unwrap(), 1);
}

#[test]
fn fix_sequences_is_idempotent() {
    let ctx = TestContext::new();
    ctx.init().success();
    ctx.setup_root().success();

    let first = stdout_lines(&ctx.fix_sequences().success());
    let before = ctx.open_store().sequence_value("namespaces_id_seq").unwrap();
    let second = stdout_lines(&ctx.fix_sequences().success());

    assert_eq!(first, second);
    assert_eq!(
        ctx.open_store().sequence_value("namespaces_id_seq").unwrap(),
        before
    );
}

// ============================================================================
// Root provisioning
// ============================================================================

#[test]
fn setup_root_creates_account_with_usable_password() {
    let ctx = TestContext::new();
    ctx.init().success();

    let assert = ctx
        .setup_root_cmd()
        .env("ROOTSTRAP_PASSWORD", "env-password-1")
        .assert()
        .success();

    assert_eq!(
        stdout_lines(&assert),
        vec![
            "Creating namespace via database...",
            "Namespace created via database",
            "Root user created",
            "Root user has functional password",
            "Root user has namespace: root",
            "Root user setup completed",
        ]
    );

    let store = ctx.open_store();
    let user = store.get_user_by_username("root").unwrap().unwrap();
    assert!(user.admin);
    assert!(user.confirmed_at.is_some());
    let hasher = SecretHasher::new().unwrap();
    assert!(hasher.verify("env-password-1", &user.encrypted_password).unwrap());
}

#[test]
fn setup_root_rerun_does_not_duplicate_account() {
    let ctx = TestContext::new();
    ctx.init().success();
    ctx.setup_root().success();

    ctx.setup_root()
        .success()
        .stdout(predicate::str::contains("Namespace already exists"))
        .stdout(predicate::str::contains("Root user already exists"))
        .stdout(predicate::str::contains("Root user has functional password"));

    let count: i64 = ctx
        .open_store()
        .connection()
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn setup_root_reads_password_file_when_env_unset() {
    let ctx = TestContext::new();
    ctx.init().success();
    std::fs::write(ctx.password_file(), "file-password\n").unwrap();

    ctx.setup_root().success();

    let user = ctx.open_store().get_user_by_username("root").unwrap().unwrap();
    let hasher = SecretHasher::new().unwrap();
    assert!(hasher.verify("file-password", &user.encrypted_password).unwrap());
}

#[test]
fn setup_root_resets_password_of_existing_account() {
    let ctx = TestContext::new();
    ctx.init().success();
    ctx.setup_root().success();

    ctx.setup_root_cmd()
        .env("ROOTSTRAP_PASSWORD", "rotated-password")
        .assert()
        .success();

    let user = ctx.open_store().get_user_by_username("root").unwrap().unwrap();
    let hasher = SecretHasher::new().unwrap();
    assert!(hasher.verify("rotated-password", &user.encrypted_password).unwrap());
    assert!(!hasher.verify("changeme", &user.encrypted_password).unwrap());
}

// ============================================================================
// Namespace verification
// ============================================================================

#[test]
fn verify_namespace_fails_without_root_account() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.verify_namespace()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("account 'root' not found"));
}

#[test]
fn verify_namespace_prints_linked_path() {
    let ctx = TestContext::new();
    ctx.init().success();
    ctx.setup_root().success();

    ctx.verify_namespace()
        .success()
        .stdout(predicate::str::contains("Root user namespace verified: root"));
}

#[test]
fn verify_namespace_falls_back_to_path_lookup() {
    let ctx = TestContext::new();
    ctx.init().success();

    let root = RootAccount::default();
    let store = ctx.open_store();
    store
        .ensure_user(&root.new_user("$argon2id$stub".to_string()), WriteMode::SkipValidation)
        .unwrap();
    let mut seed = root.namespace_seed();
    seed.owner_id = 77;
    store.ensure_namespace(&seed).unwrap();
    drop(store);

    ctx.verify_namespace()
        .success()
        .stdout(predicate::str::contains("Root user namespace not linked yet"))
        .stdout(predicate::str::contains("Root namespace exists in database"));
}

#[test]
fn verify_namespace_fails_when_namespace_missing() {
    let ctx = TestContext::new();
    ctx.init().success();

    let store = ctx.open_store();
    store
        .ensure_user(
            &RootAccount::default().new_user("$argon2id$stub".to_string()),
            WriteMode::SkipValidation,
        )
        .unwrap();
    drop(store);

    ctx.verify_namespace()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Checking for existing root namespace..."))
        .stderr(predicate::str::contains("no namespace found at path 'root'"));
}

#[test]
fn verify_namespace_does_not_write() {
    let ctx = TestContext::new();
    ctx.init().success();
    ctx.setup_root().success();

    let before = ctx.open_store().get_user_by_username("root").unwrap().unwrap();
    ctx.verify_namespace().success();
    let after = ctx.open_store().get_user_by_username("root").unwrap().unwrap();

    assert_eq!(before.updated_at, after.updated_at);
    assert_eq!(before.encrypted_password, after.encrypted_password);
}
