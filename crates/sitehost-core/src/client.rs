//! SiteHost API client
//!
//! Every call is one request and one reply. Nothing here raises: a reply
//! that can not be used (unreachable host, non-200 status, bad JSON) comes
//! back as the invalid [`Response`], and a job status request for such a reply
//! derives [`JobState::Failed`](crate::JobState::Failed).
//!
//! # Example
//!
//! ```rust,ignore
//! use sitehost_core::{Client, JobType};
//!
//! let client = Client::builder()
//!     .api_key("0123456789abcdef")
//!     .client_id("12345")
//!     .build()?;
//!
//! let stack = client.stack_info("ch-myserver", "abc123def456ab12").await;
//! if stack.is_valid() {
//!     println!("label: {:?}", stack.data_str("label"));
//! }
//!
//! let job = client.job_info("54321", JobType::Scheduler).await;
//! println!("job state: {}", job.state());
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::job::{Job, JobType};
use crate::response::Response;
use crate::transport::{ApiRequest, HttpTransport, Method, Transport};

/// Default API endpoint
pub const DEFAULT_API_URL: &str = "https://mysth.safeserver.net.nz";

/// API endpoint paths
pub mod endpoints {
    /// Info about the API key, including the client id and roles
    pub const API_GET_INFO: &str = "/1.0/api/get_info.json";
    /// Cloud stack details
    pub const CLOUD_STACK_GET: &str = "/1.0/cloud/stack/get.json";
    /// Cloud stack update (label, compose file, environments)
    pub const CLOUD_STACK_UPDATE: &str = "/1.0/cloud/stack/update.json";
    /// Cloud stack restart
    pub const CLOUD_STACK_RESTART: &str = "/1.0/cloud/stack/restart.json";
    /// Job status
    pub const JOB_GET: &str = "/1.0/job/get.json";
}

const PARAM_API_KEY: &str = "apikey";
const PARAM_CLIENT_ID: &str = "client_id";

/// Fields of a stack that [`Client::update_stack`] may change
///
/// Empty fields are left out of the request, which tells the API to keep the
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackUpdate {
    pub label: String,
    pub docker_compose: String,
    pub environments: String,
}

impl StackUpdate {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn docker_compose(docker_compose: impl Into<String>) -> Self {
        Self {
            docker_compose: docker_compose.into(),
            ..Default::default()
        }
    }

    pub fn environments(environments: impl Into<String>) -> Self {
        Self {
            environments: environments.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_empty() && self.docker_compose.is_empty() && self.environments.is_empty()
    }

    fn params(&self) -> Vec<(String, String)> {
        [
            ("params[label]", &self.label),
            ("params[docker_compose]", &self.docker_compose),
            ("params[environments]", &self.environments),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
    }
}

/// Builder for [`Client`]
#[derive(Default)]
pub struct ClientBuilder {
    api_key: Option<String>,
    client_id: Option<String>,
    api_url: Option<String>,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Override the API endpoint; a trailing `/` is dropped
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Per-request timeout for the default HTTP transport
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a custom transport instead of [`HttpTransport`]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<Client> {
        let api_key = self
            .api_key
            .ok_or_else(|| CoreError::Http("API key is required".to_string()))?;
        let client_id = self
            .client_id
            .ok_or_else(|| CoreError::Http("Client ID is required".to_string()))?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::with_timeout(
                self.timeout.unwrap_or(crate::transport::DEFAULT_TIMEOUT),
            )?),
        };
        let api_url = self.api_url.as_deref().unwrap_or(DEFAULT_API_URL);

        Ok(Client {
            api_key,
            client_id,
            api_url: api_url.trim_end_matches('/').to_string(),
            transport,
        })
    }
}

/// SiteHost API client
#[derive(Clone)]
pub struct Client {
    api_key: String,
    client_id: String,
    api_url: String,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("api_url", &self.api_url)
            .field("client_id", &self.client_id)
            .field("api_key", &"<REDACTED>")
            .finish()
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Status of an asynchronous job
    pub async fn job_info(&self, job_id: &str, job_type: JobType) -> Job {
        let response = self
            .get(
                endpoints::JOB_GET,
                params(&[("job_id", job_id), ("type", job_type.as_str())]),
            )
            .await;
        Job::from_response(response)
    }

    /// Info about the API key (client id, roles)
    pub async fn api_info(&self) -> Response {
        self.get(endpoints::API_GET_INFO, Vec::new()).await
    }

    /// Details of a cloud stack on a server
    ///
    /// In the control panel URL
    /// `.../cloud/manage-container/server/ch-myserver/stack/abc123def456ab12`,
    /// `ch-myserver` is the server and `abc123def456ab12` the stack.
    pub async fn stack_info(&self, server: &str, stack: &str) -> Response {
        self.get(
            endpoints::CLOUD_STACK_GET,
            params(&[("server", server), ("name", stack)]),
        )
        .await
    }

    /// Update a cloud stack; empty fields of `update` are left unchanged
    pub async fn update_stack(&self, server: &str, stack: &str, update: &StackUpdate) -> Response {
        let mut data = params(&[("server", server), ("name", stack)]);
        data.extend(update.params());
        self.post(endpoints::CLOUD_STACK_UPDATE, data).await
    }

    pub async fn update_stack_label(&self, server: &str, stack: &str, label: &str) -> Response {
        self.update_stack(server, stack, &StackUpdate::label(label))
            .await
    }

    pub async fn update_stack_docker_compose(
        &self,
        server: &str,
        stack: &str,
        docker_compose: &str,
    ) -> Response {
        self.update_stack(server, stack, &StackUpdate::docker_compose(docker_compose))
            .await
    }

    pub async fn update_stack_environments(
        &self,
        server: &str,
        stack: &str,
        environments: &str,
    ) -> Response {
        self.update_stack(server, stack, &StackUpdate::environments(environments))
            .await
    }

    /// Restart a stack, or a single container of it
    pub async fn restart_stack(
        &self,
        server: &str,
        stack: &str,
        container: Option<&str>,
    ) -> Response {
        let mut data = params(&[("server", server), ("name", stack)]);
        if let Some(container) = container.filter(|c| !c.is_empty()) {
            data.push(("containers[]".to_string(), container.to_string()));
        }
        self.post(endpoints::CLOUD_STACK_RESTART, data).await
    }

    async fn get(&self, endpoint: &str, data: Vec<(String, String)>) -> Response {
        self.execute(Method::Get, endpoint, data).await
    }

    async fn post(&self, endpoint: &str, data: Vec<(String, String)>) -> Response {
        self.execute(Method::Post, endpoint, data).await
    }

    async fn execute(&self, method: Method, endpoint: &str, data: Vec<(String, String)>) -> Response {
        let request = ApiRequest {
            method,
            url: format!("{}{}", self.api_url, endpoint),
            params: self.prepare_query_data(data),
        };

        match self.transport.send(request).await {
            Ok(raw) => {
                let response = Response::from_http(raw.status, &raw.body);
                if !response.is_valid() {
                    debug!(
                        status = raw.status,
                        message = response.message(),
                        "{} {} returned no usable data",
                        method,
                        endpoint
                    );
                }
                response
            }
            Err(e) => {
                warn!("{} {} failed: {}", method, endpoint, e);
                Response::invalid()
            }
        }
    }

    /// Identity parameters first, then the caller's data minus any identity keys
    fn prepare_query_data(&self, data: Vec<(String, String)>) -> Vec<(String, String)> {
        let mut query = params(&[
            (PARAM_API_KEY, &self.api_key),
            (PARAM_CLIENT_ID, &self.client_id),
        ]);
        query.extend(
            data.into_iter()
                .filter(|(key, _)| key != PARAM_API_KEY && key != PARAM_CLIENT_ID),
        );
        query
    }
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
