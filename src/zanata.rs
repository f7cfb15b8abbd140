//! Minimal client for the Zanata translation-platform REST API.
//!
//! Read-only: list projects, list a project's versions, and fetch one
//! contributor's statistics for a date range. Transient failures (5xx,
//! transport) are retried with backoff; client errors fail immediately.

use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::debug;

const USER_AGENT: &str = concat!("i18n-check/", env!("CARGO_PKG_VERSION"));

static VERSION_REGEX: OnceLock<Regex> = OnceLock::new();

/// Versions worth reporting on: the development snapshot and stable
/// release branches. Everything else on the platform is noise.
pub fn is_valid_version(version: &str) -> bool {
    let regex = VERSION_REGEX
        .get_or_init(|| Regex::new(r"^(master[-,a-z]*|stable-[a-z]+)$").unwrap());
    regex.is_match(version)
}

#[derive(Debug, Deserialize)]
struct ProjectRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProjectDetail {
    #[serde(default)]
    iterations: Vec<IterationRef>,
}

#[derive(Debug, Deserialize)]
struct IterationRef {
    id: String,
}

/// Translation activity counters as returned by Zanata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TranslationCounts {
    #[serde(default)]
    pub translated: u64,
    #[serde(rename = "needReview", default)]
    pub need_review: u64,
    #[serde(default)]
    pub approved: u64,
    #[serde(default)]
    pub rejected: u64,
}

/// Review activity counters as returned by Zanata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ReviewCounts {
    #[serde(default)]
    pub approved: u64,
    #[serde(default)]
    pub rejected: u64,
}

/// One per-locale contribution block of a contributor-statistics response.
#[derive(Debug, Clone, Deserialize)]
pub struct Contribution {
    pub locale: String,
    #[serde(rename = "translation-stats")]
    pub translation_stats: Option<TranslationCounts>,
    #[serde(rename = "review-stats")]
    pub review_stats: Option<ReviewCounts>,
}

/// Contributor-statistics response for one user.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributorStats {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
}

/// Zanata REST API client.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryConfig::api_call(),
        })
    }

    /// Override the retry configuration (tests use short delays).
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {}", url);

        with_retry_if(
            &self.retry,
            path,
            || self.fetch(&url),
            is_retryable_error,
        )
        .await
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("failed to reach {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Zanata API error ({}): {}", status, truncate(&body));
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("invalid JSON from {}", url))
    }

    /// List all project ids known to the platform.
    pub async fn projects(&self) -> Result<Vec<String>> {
        let projects: Vec<ProjectRef> = self.get_json("projects").await?;
        Ok(projects.into_iter().map(|p| p.id).collect())
    }

    /// List a project's version ids, filtered to reportable versions.
    pub async fn versions(&self, project_id: &str) -> Result<Vec<String>> {
        let detail: ProjectDetail = self.get_json(&format!("projects/p/{}", project_id)).await?;
        Ok(detail
            .iterations
            .into_iter()
            .map(|i| i.id)
            .filter(|id| is_valid_version(id))
            .collect())
    }

    /// Fetch one contributor's statistics for a version and date range.
    ///
    /// Dates use the `YYYY-MM-DD` form the platform expects.
    pub async fn user_stats(
        &self,
        project_id: &str,
        version: &str,
        user_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<ContributorStats> {
        self.get_json(&format!(
            "stats/project/{}/version/{}/contributor/{}/{}..{}",
            project_id, version, user_id, start_date, end_date
        ))
        .await
    }
}

/// Transient errors are worth retrying; 4xx responses are not.
/// Error format: "Zanata API error (500 Internal Server Error): ..."
fn is_retryable_error(error: &anyhow::Error) -> bool {
    let message = error.to_string();
    match message.find("Zanata API error (") {
        Some(start) => message[start + 18..].starts_with('5'),
        // Transport-level failures carry no status; retry them.
        None => true,
    }
}

fn truncate(body: &str) -> String {
    const LIMIT: usize = 200;
    if body.chars().count() <= LIMIT {
        body.to_string()
    } else {
        let prefix: String = body.chars().take(LIMIT).collect();
        format!("{}...", prefix)
    }
}
