//! Integration tests for the API client, job poller and alias workflow
//! against a mock SiteHost API

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use sitehost_core::{
    AliasOutcome, AliasUpdate, Client, CoreError, JobState, JobType, PollOptions, ProgressEvent,
    Response, StackUpdate, add_alias_to_stack, wait_for_job,
};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVER: &str = "ch-myserver";
const STACK: &str = "abc123def456ab12";

fn client(server: &MockServer) -> Client {
    Client::builder()
        .api_key("test-key")
        .client_id("12345")
        .api_url(format!("{}/", server.uri()))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": true,
        "msg": "Successful",
        "return": data,
    }))
}

fn fast_poll() -> PollOptions {
    PollOptions::new(Duration::from_secs(5), Duration::from_millis(10))
}

fn compose_file(environment_vhosts: &str, label_vhosts: &str) -> String {
    format!(
        "version: '2.1'\n\
         services:\n  \
           {STACK}:\n    \
             image: 'registry.sitehost.co.nz/sitehost-php81-nginx:5.0.0'\n    \
             environment:\n      \
               - '{environment_vhosts}'\n      \
               - 'CERT_NAME=example.com'\n    \
             labels:\n      \
               - '{label_vhosts}'\n"
    )
}

// ============================================================================
// Requests and envelopes
// ============================================================================

#[tokio::test]
async fn test_api_info_sends_identity_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.0/api/get_info.json"))
        .and(query_param("apikey", "test-key"))
        .and(query_param("client_id", "12345"))
        .respond_with(ok(json!({"client_id": 12345, "roles": ["stack"]})))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server).api_info().await;

    assert!(response.is_valid());
    assert_eq!(response.message(), "Successful");
    assert_eq!(response.data_item("client_id"), Some(&json!(12345)));
}

#[tokio::test]
async fn test_stack_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.0/cloud/stack/get.json"))
        .and(query_param("server", SERVER))
        .and(query_param("name", STACK))
        .respond_with(ok(json!({"name": STACK, "label": "My site"})))
        .mount(&server)
        .await;

    let response = client(&server).stack_info(SERVER, STACK).await;

    assert_eq!(response.data_str("label"), Some("My site"));
}

#[tokio::test]
async fn test_non_200_reply_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": true,
            "return": {"name": STACK}
        })))
        .mount(&server)
        .await;

    let response = client(&server).stack_info(SERVER, STACK).await;

    assert_eq!(response, Response::invalid());
}

#[tokio::test]
async fn test_malformed_json_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Bad gateway</html>"))
        .mount(&server)
        .await;

    let response = client(&server).api_info().await;

    assert!(!response.is_valid());
    assert_eq!(response.message(), "");
}

#[tokio::test]
async fn test_error_envelope_keeps_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": false,
            "msg": "Invalid API key",
            "return": []
        })))
        .mount(&server)
        .await;

    let response = client(&server).api_info().await;

    assert!(!response.is_valid());
    assert_eq!(response.message(), "Invalid API key");
}

#[tokio::test]
async fn test_unreachable_host_is_invalid() {
    let client = Client::builder()
        .api_key("k")
        .client_id("1")
        .api_url("http://127.0.0.1:1")
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    assert!(!client.api_info().await.is_valid());
    assert!(client.job_info("1", JobType::Scheduler).await.has_failed());
}

#[tokio::test]
async fn test_update_stack_posts_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.0/cloud/stack/update.json"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("apikey=test-key&client_id=12345"))
        .and(body_string_contains("server=ch-myserver"))
        .and(body_string_contains("params%5Blabel%5D=New+label"))
        .respond_with(ok(json!({"job_id": "777"})))
        .expect(1)
        .mount(&server)
        .await;

    let update = StackUpdate::label("New label");
    let response = client(&server).update_stack(SERVER, STACK, &update).await;

    assert_eq!(response.data_str("job_id"), Some("777"));
}

#[tokio::test]
async fn test_restart_single_container() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.0/cloud/stack/restart.json"))
        .and(body_string_contains("containers%5B%5D=abc123def456ab12-web"))
        .respond_with(ok(json!({"job_id": "778"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .restart_stack(SERVER, STACK, Some("abc123def456ab12-web"))
        .await;

    assert!(response.is_valid());
}

// ============================================================================
// Jobs
// ============================================================================

#[tokio::test]
async fn test_job_info_daemon() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.0/job/get.json"))
        .and(query_param("job_id", "55"))
        .and(query_param("type", "daemon"))
        .respond_with(ok(json!({"id": "55", "state": "Running"})))
        .mount(&server)
        .await;

    let job = client(&server).job_info("55", JobType::Daemon).await;

    assert!(job.is_running());
    assert_eq!(job.response().data_str("id"), Some("55"));
}

#[tokio::test]
async fn test_wait_for_job_completes() {
    let server = MockServer::start().await;
    Mock::given(path("/1.0/job/get.json"))
        .respond_with(ok(json!({"state": "Pending"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(path("/1.0/job/get.json"))
        .respond_with(ok(json!({"state": "Running"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(path("/1.0/job/get.json"))
        .respond_with(ok(json!({"state": "Completed"})))
        .mount(&server)
        .await;

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let job = wait_for_job(
        &client(&server),
        "9",
        JobType::Scheduler,
        &fast_poll(),
        Some(Box::new(move |event| sink.lock().unwrap().push(event))),
    )
    .await
    .unwrap();

    assert!(job.has_completed());
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0], ProgressEvent::Started { job_id: "9".into() });
    assert!(matches!(
        &events[1],
        ProgressEvent::Polling { state: JobState::Pending, .. }
    ));
    assert!(matches!(
        &events[2],
        ProgressEvent::Polling { state: JobState::Running, .. }
    ));
    assert_eq!(events[3], ProgressEvent::Completed { job_id: "9".into() });
}

#[tokio::test]
async fn test_wait_for_job_failed_state() {
    let server = MockServer::start().await;
    Mock::given(path("/1.0/job/get.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "msg": "Image pull failed",
            "return": {"state": "Failed"}
        })))
        .mount(&server)
        .await;

    let err = wait_for_job(
        &client(&server),
        "9",
        JobType::Scheduler,
        &fast_poll(),
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::JobFailed(ref msg) if msg == "Image pull failed"));
}

#[tokio::test]
async fn test_wait_for_job_stops_on_bad_reply() {
    let server = MockServer::start().await;
    Mock::given(path("/1.0/job/get.json"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let err = wait_for_job(
        &client(&server),
        "9",
        JobType::Scheduler,
        &fast_poll(),
        None,
    )
    .await
    .unwrap_err();

    assert!(err.is_job_failure());
}

#[tokio::test]
async fn test_wait_for_job_times_out() {
    let server = MockServer::start().await;
    Mock::given(path("/1.0/job/get.json"))
        .respond_with(ok(json!({"state": "Running"})))
        .mount(&server)
        .await;

    let options = PollOptions::new(Duration::from_millis(50), Duration::from_millis(20));
    let err = wait_for_job(&client(&server), "9", JobType::Scheduler, &options, None)
        .await
        .unwrap_err();

    assert!(err.is_timeout());
}

// ============================================================================
// Alias workflow
// ============================================================================

#[tokio::test]
async fn test_add_alias_posts_merged_compose() {
    let server = MockServer::start().await;
    let compose = compose_file(
        "VIRTUAL_HOST=example.com",
        "nz.sitehost.container.website.vhosts=example.com",
    );
    Mock::given(method("GET"))
        .and(path("/1.0/cloud/stack/get.json"))
        .respond_with(ok(json!({"name": STACK, "docker_file": compose})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1.0/cloud/stack/update.json"))
        .and(body_string_contains("params%5Bdocker_compose%5D="))
        .and(body_string_contains(
            "VIRTUAL_HOST%3Dexample.com%2Cwww.example.com",
        ))
        .respond_with(ok(json!({"job_id": "901"})))
        .expect(1)
        .mount(&server)
        .await;

    let update = add_alias_to_stack(&client(&server), SERVER, STACK, "www.example.com")
        .await
        .unwrap();

    let response = update.response().expect("update should be sent");
    assert_eq!(response.data_str("job_id"), Some("901"));
}

#[tokio::test]
async fn test_add_alias_partial_merge_is_not_sent() {
    let server = MockServer::start().await;
    let compose = compose_file("VIRTUAL_HOST=example.com", "traefik.enable=true");
    Mock::given(method("GET"))
        .and(path("/1.0/cloud/stack/get.json"))
        .respond_with(ok(json!({"name": STACK, "docker_file": compose})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ok(json!({"job_id": "1"})))
        .expect(0)
        .mount(&server)
        .await;

    let update = add_alias_to_stack(&client(&server), SERVER, STACK, "www.example.com")
        .await
        .unwrap();

    assert_eq!(
        update,
        AliasUpdate::Skipped {
            outcome: AliasOutcome::PartiallyMerged {
                environment: true,
                labels: false
            }
        }
    );
}

#[tokio::test]
async fn test_add_alias_empty_alias_is_not_sent() {
    let server = MockServer::start().await;
    let compose = compose_file(
        "VIRTUAL_HOST=example.com",
        "nz.sitehost.container.website.vhosts=example.com",
    );
    Mock::given(method("GET"))
        .and(path("/1.0/cloud/stack/get.json"))
        .respond_with(ok(json!({"name": STACK, "docker_file": compose})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ok(json!({"job_id": "1"})))
        .expect(0)
        .mount(&server)
        .await;

    for alias in ["", " , "] {
        let update = add_alias_to_stack(&client(&server), SERVER, STACK, alias)
            .await
            .unwrap();

        assert_eq!(
            update,
            AliasUpdate::Skipped {
                outcome: AliasOutcome::EmptyAlias
            }
        );
        assert!(update.response().is_none());
    }
}

#[tokio::test]
async fn test_add_alias_unknown_stack() {
    let server = MockServer::start().await;
    let compose = compose_file(
        "VIRTUAL_HOST=example.com",
        "nz.sitehost.container.website.vhosts=example.com",
    );
    Mock::given(method("GET"))
        .respond_with(ok(json!({"docker_file": compose})))
        .mount(&server)
        .await;

    let update = add_alias_to_stack(&client(&server), SERVER, "otherstack", "a.com")
        .await
        .unwrap();

    assert_eq!(
        update,
        AliasUpdate::Skipped {
            outcome: AliasOutcome::StackNotFound
        }
    );
}

#[tokio::test]
async fn test_add_alias_without_compose_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let update = add_alias_to_stack(&client(&server), SERVER, STACK, "a.com")
        .await
        .unwrap();

    assert_eq!(update, AliasUpdate::ComposeUnavailable);
}

#[tokio::test]
async fn test_add_alias_broken_compose_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok(json!({"docker_file": "services: [unclosed"})))
        .mount(&server)
        .await;

    let err = add_alias_to_stack(&client(&server), SERVER, STACK, "a.com")
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Compose(_)));
}
