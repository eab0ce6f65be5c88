//! HTTP client for the Concourse API.
//!
//! Covers the handful of endpoints the collector needs: token login, listing
//! pipelines, jobs and job builds, and fetching one build's plan and event
//! stream.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    config::ConcourseConfig,
    error::{CollectorError, HttpResultExt, Result},
    models::{decode_plan, Build, EventRecord, Job, Pipeline, PlanNode},
    source::BuildSource,
};

pub mod stream;

pub use stream::{decode_events, parse_event_stream, EventStreamParser};

const CONNECT_TIMEOUT_SECS: u64 = 30;

// Credentials of the public `fly` OAuth client.
const TOKEN_CLIENT_ID: &str = "fly";
const TOKEN_CLIENT_SECRET: &str = "Zmx5";
const TOKEN_SCOPES: &str = "openid profile email federated:id groups";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
}

/// Authenticated client for one team of a Concourse server.
#[derive(Debug, Clone)]
pub struct ConcourseClient {
    base_url: Url,
    team: String,
    http: Client,
    token: Option<String>,
    page_limit: Option<u32>,
}

impl ConcourseClient {
    /// Creates an unauthenticated client.
    pub fn new(base_url: &str, team: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            CollectorError::invalid_input("url").with_reason(format!("{base_url}: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CollectorError::invalid_input("url")
                .with_reason(format!("{base_url} cannot be used as a base URL")));
        }

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .http_context("Failed to build HTTP client")?;

        Ok(Self {
            base_url,
            team: team.into(),
            http,
            token: None,
            page_limit: None,
        })
    }

    /// Creates a client from configuration and logs in when credentials are
    /// present.
    pub async fn connect(config: &ConcourseConfig) -> Result<Self> {
        let mut client = Self::new(&config.url, config.team.as_str())?;
        if !config.username.is_empty() {
            client.login(&config.username, &config.password).await?;
        }
        Ok(client)
    }

    /// Caps the number of builds requested per job.
    pub fn with_page_limit(mut self, limit: Option<u32>) -> Self {
        self.page_limit = limit;
        self
    }

    /// Team this client lists pipelines for.
    pub fn team(&self) -> &str {
        &self.team
    }

    /// Obtains a bearer token with the password grant.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let url = self.endpoint(&["sky", "token"])?;
        debug!("Requesting token from {url}");

        let response = self
            .http
            .post(url)
            .basic_auth(TOKEN_CLIENT_ID, Some(TOKEN_CLIENT_SECRET))
            .form(&[
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
                ("scope", TOKEN_SCOPES),
            ])
            .send()
            .await
            .http_context("Failed to request token")?;

        if !response.status().is_success() {
            return Err(CollectorError::Authentication {
                message: format!("token endpoint answered {}", response.status()),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .http_context("Failed to decode token response")?;
        if !token.token_type.is_empty() && !token.token_type.eq_ignore_ascii_case("bearer") {
            return Err(CollectorError::Authentication {
                message: format!("unsupported token type '{}'", token.token_type),
            });
        }

        info!("Logged in to {} as {username}", self.base_url);
        self.token = Some(token.access_token);
        Ok(())
    }

    /// Lists the team's pipelines.
    pub async fn pipelines(&self) -> Result<Vec<Pipeline>> {
        let url = self.endpoint(&["api", "v1", "teams", self.team.as_str(), "pipelines"])?;
        self.get_json(url).await
    }

    /// Lists the jobs of a pipeline.
    pub async fn jobs(&self, pipeline: &str) -> Result<Vec<Job>> {
        let url = self.endpoint(&[
            "api", "v1", "teams", self.team.as_str(), "pipelines", pipeline, "jobs",
        ])?;
        self.get_json(url).await
    }

    /// Lists the most recent builds of a job.
    pub async fn job_builds(&self, pipeline: &str, job: &str) -> Result<Vec<Build>> {
        let mut url = self.endpoint(&[
            "api", "v1", "teams", self.team.as_str(), "pipelines", pipeline, "jobs", job, "builds",
        ])?;
        if let Some(limit) = self.page_limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }
        self.get_json(url).await
    }

    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                CollectorError::invalid_input("url").with_reason("cannot be used as a base URL")
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized_get(&self, url: Url) -> RequestBuilder {
        let request = self.http.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, url: Url) -> Result<Response> {
        self.authorized_get(url.clone())
            .send()
            .await
            .http_context(&format!("Failed to request {url}"))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = ensure_success(self.send(url.clone()).await?)?;
        response
            .json()
            .await
            .http_context(&format!("Failed to decode response from {url}"))
    }
}

fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(CollectorError::UnexpectedStatus {
            url: response.url().to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl BuildSource for ConcourseClient {
    async fn completed_builds(&self, cutoff: i64) -> Result<Vec<Build>> {
        let mut builds = Vec::new();

        for pipeline in self.pipelines().await? {
            for job in self.jobs(&pipeline.name).await? {
                let job_builds = self.job_builds(&pipeline.name, &job.name).await?;
                debug!(
                    "{}/{}: {} builds listed",
                    pipeline.name,
                    job.name,
                    job_builds.len()
                );
                builds.extend(job_builds.into_iter().filter(|build| build.qualifies(cutoff)));
            }
        }

        Ok(builds)
    }

    async fn build_plan(&self, build_id: u64) -> Result<Option<PlanNode>> {
        let id = build_id.to_string();
        let url = self.endpoint(&["api", "v1", "builds", id.as_str(), "plan"])?;
        let response = self.send(url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let bytes = ensure_success(response)?
            .bytes()
            .await
            .http_context("Failed to read build plan")?;
        decode_plan(&bytes, Some(build_id)).map(Some)
    }

    async fn build_events(&self, build_id: u64) -> Result<Vec<EventRecord>> {
        let id = build_id.to_string();
        let url = self.endpoint(&["api", "v1", "builds", id.as_str(), "events"])?;
        let mut response = ensure_success(
            self.authorized_get(url)
                .header(header::ACCEPT, "text/event-stream")
                .send()
                .await
                .http_context("Failed to request build events")?,
        )?;

        let mut parser = EventStreamParser::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .http_context("Failed to read build events")?
        {
            parser.feed(&chunk)?;
            if parser.is_ended() {
                break;
            }
        }
        parser.finish()
    }
}
