use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a test command with no ambient profile selection
fn sitehostctl() -> Command {
    let mut cmd = Command::cargo_bin("sitehostctl").unwrap();
    cmd.env_remove("SITEHOSTCTL_PROFILE")
        .env_remove("SITEHOSTCTL_CONFIG_FILE")
        .env_remove("SITEHOST_API_KEY")
        .env_remove("SITEHOST_CLIENT_ID")
        .env_remove("SITEHOST_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

/// Command bound to a config file inside `dir`
fn with_config(dir: &TempDir) -> (Command, PathBuf) {
    let config = dir.path().join("config.toml");
    let mut cmd = sitehostctl();
    cmd.arg("--config-file").arg(&config);
    (cmd, config)
}

fn write_profile(config: &Path, api_url: &str) {
    std::fs::write(
        config,
        format!(
            "default_profile = \"test\"\n\n\
             [profiles.test]\n\
             api_key = \"test-key\"\n\
             client_id = \"12345\"\n\
             api_url = \"{api_url}\"\n"
        ),
    )
    .unwrap();
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": true,
        "msg": "Successful",
        "return": data,
    }))
}

// ============================================================================
// Flags and help
// ============================================================================

#[test]
fn test_help_flag() {
    sitehostctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SiteHost control API"))
        .stdout(predicate::str::contains("EXAMPLES:"));
}

#[test]
fn test_version_flag() {
    sitehostctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sitehostctl"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_command_json() {
    sitehostctl()
        .args(["version", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"sitehostctl\""));
}

#[test]
fn test_no_args_shows_help() {
    sitehostctl()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_subcommand() {
    sitehostctl()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_stack_help() {
    sitehostctl()
        .args(["stack", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("add-alias"))
        .stdout(predicate::str::contains("restart"));
}

#[test]
fn test_invalid_output_format() {
    sitehostctl()
        .args(["profile", "list", "-o", "invalid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_wait_timeout_requires_wait() {
    sitehostctl()
        .args(["stack", "restart", "ch-myserver", "abc123", "--wait-timeout", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--wait"));
}

#[test]
fn test_completions_bash() {
    sitehostctl()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sitehostctl"));
}

// ============================================================================
// Profiles
// ============================================================================

#[test]
fn test_profile_list_empty() {
    let dir = TempDir::new().unwrap();
    let (mut cmd, _) = with_config(&dir);
    cmd.args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No profiles configured"));
}

#[test]
fn test_profile_set_then_show() {
    let dir = TempDir::new().unwrap();
    let (mut cmd, config) = with_config(&dir);
    cmd.args([
        "profile",
        "set",
        "prod",
        "--api-key",
        "abcdef123456",
        "--client-id",
        "12345",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Profile 'prod' created"));

    let saved = std::fs::read_to_string(&config).unwrap();
    assert!(saved.contains("default_profile = \"prod\""));
    assert!(saved.contains("client_id = \"12345\""));

    let (mut cmd, _) = with_config(&dir);
    cmd.args(["profile", "show", "prod", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"api_key\": \"abcd****\""))
        .stdout(predicate::str::contains("\"is_default\": true"))
        .stdout(predicate::str::contains("abcdef123456").not());
}

#[test]
fn test_profile_list_json() {
    let dir = TempDir::new().unwrap();
    let (_, config) = with_config(&dir);
    write_profile(&config, "https://api.example.test");

    let (mut cmd, _) = with_config(&dir);
    cmd.args(["profile", "list", "-o", "json", "-q", "profiles[].name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"test\""));
}

#[test]
fn test_profile_show_missing() {
    let dir = TempDir::new().unwrap();
    let (mut cmd, _) = with_config(&dir);
    cmd.args(["profile", "show", "missing"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Profile 'missing' not found"))
        .stderr(predicate::str::contains("tip"));
}

#[test]
fn test_profile_default_requires_existing() {
    let dir = TempDir::new().unwrap();
    let (mut cmd, _) = with_config(&dir);
    cmd.args(["profile", "default", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_profile_remove() {
    let dir = TempDir::new().unwrap();
    let (_, config) = with_config(&dir);
    write_profile(&config, "https://api.example.test");

    let (mut cmd, _) = with_config(&dir);
    cmd.args(["profile", "remove", "test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Default profile cleared"));

    let saved = std::fs::read_to_string(&config).unwrap();
    assert!(!saved.contains("[profiles.test]"));
}

#[test]
fn test_corrupt_config_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let (mut cmd, config) = with_config(&dir);
    std::fs::write(&config, "[profiles.broken\napi_key = ").unwrap();
    cmd.args(["profile", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_api_command_without_profile() {
    let dir = TempDir::new().unwrap();
    let (mut cmd, _) = with_config(&dir);
    cmd.args(["api", "info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No profile configured"));
}

// ============================================================================
// Commands against a mock API
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_api_info_prints_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.0/api/get_info.json"))
        .and(query_param("apikey", "test-key"))
        .respond_with(ok(json!({"client_id": 12345, "roles": ["stack"]})))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (mut cmd, config) = with_config(&dir);
    write_profile(&config, &server.uri());

    cmd.args(["api", "info", "-q", "roles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"stack\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_error_message_reaches_user() {
    let server = MockServer::start().await;
    Mock::given(path("/1.0/api/get_info.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": false, "msg": "Invalid API key"})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (mut cmd, config) = with_config(&dir);
    write_profile(&config, &server.uri());

    cmd.args(["api", "info"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("API error: Invalid API key"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_job_get_auto_output() {
    let server = MockServer::start().await;
    Mock::given(path("/1.0/job/get.json"))
        .and(query_param("job_id", "42"))
        .and(query_param("type", "daemon"))
        .respond_with(ok(json!({"id": "42", "state": "Running"})))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (mut cmd, config) = with_config(&dir);
    write_profile(&config, &server.uri());

    cmd.args(["job", "get", "42", "--type", "daemon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Job 42:"))
        .stdout(predicate::str::contains("Running"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stack_compose_prints_yaml() {
    let server = MockServer::start().await;
    Mock::given(path("/1.0/cloud/stack/get.json"))
        .respond_with(ok(json!({
            "name": "abc123",
            "docker_file": "services:\n  abc123:\n    image: nginx\n",
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (mut cmd, config) = with_config(&dir);
    write_profile(&config, &server.uri());

    cmd.args(["stack", "compose", "ch-myserver", "abc123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("image: nginx"));
}

#[test]
fn test_stack_update_requires_a_field() {
    let dir = TempDir::new().unwrap();
    let (mut cmd, config) = with_config(&dir);
    write_profile(&config, "http://127.0.0.1:1");

    cmd.args(["stack", "update", "ch-myserver", "abc123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to update"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stack_add_alias_queues_update() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.0/cloud/stack/get.json"))
        .respond_with(ok(json!({
            "name": "abc123",
            "docker_file": "services:\n  abc123:\n    image: nginx\n    environment:\n      - VIRTUAL_HOST=example.com\n    labels:\n      - nz.sitehost.container.website.vhosts=example.com\n",
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1.0/cloud/stack/update.json"))
        .and(body_string_contains("www.example.com"))
        .respond_with(ok(json!({"job_id": "77"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (mut cmd, config) = with_config(&dir);
    write_profile(&config, &server.uri());

    cmd.args(["stack", "add-alias", "ch-myserver", "abc123", "www.example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alias www.example.com added"))
        .stdout(predicate::str::contains("Job ID: 77"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stack_add_alias_unknown_service_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.0/cloud/stack/get.json"))
        .respond_with(ok(json!({
            "name": "abc123",
            "docker_file": "services:\n  other:\n    image: nginx\n",
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ok(json!({"job_id": "77"})))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (mut cmd, config) = with_config(&dir);
    write_profile(&config, &server.uri());

    cmd.args(["stack", "add-alias", "ch-myserver", "abc123", "www.example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no service named abc123"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wait_without_job_id_says_so() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.0/cloud/stack/restart.json"))
        .respond_with(ok(json!({"name": "abc123"})))
        .mount(&server)
        .await;
    Mock::given(path("/1.0/job/get.json"))
        .respond_with(ok(json!({"state": "Completed"})))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (mut cmd, config) = with_config(&dir);
    write_profile(&config, &server.uri());

    cmd.args(["stack", "restart", "ch-myserver", "abc123", "--wait"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restart of abc123 queued"))
        .stderr(predicate::str::contains("no job to wait on"));
}

#[test]
fn test_wait_interval_zero_rejected() {
    sitehostctl()
        .args(["job", "wait", "42", "--wait-interval", "0"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--wait-interval"));
}
