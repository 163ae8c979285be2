//! Modrinth HTTP backend
//!
//! One `GET {api}/project/{slug}` per catalog row, with the slug
//! percent-encoded as a single path segment. Status codes and transport
//! errors are folded into `LookupResult`; nothing here returns an error to
//! the caller once the client is built.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::backend::{LookupResult, MetadataSource};
use crate::catalog::{is_unresolved_slug, Compat};
use crate::config::LookupConfig;

/// User-Agent sent with every lookup
pub const USER_AGENT: &str = concat!("modsorter/", env!("CARGO_PKG_VERSION"));

const MIN_TIMEOUT_SECONDS: u64 = 1;

/// Modrinth project lookup client
#[derive(Debug, Clone)]
pub struct ModrinthClient {
    client: reqwest::Client,
    api_base_url: Url,
    project_url_base: Url,
    timeout: Duration,
}

/// Subset of the project response we care about
#[derive(Debug, Deserialize)]
struct ProjectResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    client_side: Option<String>,
    #[serde(default)]
    server_side: Option<String>,
}

impl ModrinthClient {
    /// Create a client from lookup configuration
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let timeout_seconds = if config.timeout_seconds < MIN_TIMEOUT_SECONDS {
            warn!(
                "Configured timeout_seconds={} is too low; using minimum of {} seconds",
                config.timeout_seconds, MIN_TIMEOUT_SECONDS
            );
            MIN_TIMEOUT_SECONDS
        } else {
            config.timeout_seconds
        };
        let timeout = Duration::from_secs(timeout_seconds);

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base_url: parse_base_url("lookup.api_base_url", &config.api_base_url)?,
            project_url_base: parse_base_url(
                "lookup.project_url_base",
                &config.project_url_base,
            )?,
            timeout,
        })
    }

    fn project_endpoint(&self, slug: &str) -> Url {
        append_segments(&self.api_base_url, &["project", slug])
    }

    /// Canonical human-facing page for a project
    pub fn project_url(&self, slug: &str) -> String {
        append_segments(&self.project_url_base, &[slug]).to_string()
    }

    fn describe_transport_error(&self, e: &reqwest::Error) -> String {
        if e.is_timeout() {
            format!("Request timed out after {} seconds", self.timeout.as_secs())
        } else if e.is_connect() {
            "Connection failed - check your internet connection".to_string()
        } else {
            e.to_string()
        }
    }
}

fn parse_base_url(key: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("Invalid {key}: {raw}"))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("Invalid {}: {} cannot take a path", key, raw);
    }
    Ok(url)
}

/// `base` with each segment appended and percent-encoded on its own
fn append_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

#[async_trait]
impl MetadataSource for ModrinthClient {
    async fn lookup(&self, filename: &str, slug: &str) -> LookupResult {
        if is_unresolved_slug(slug) {
            info!("[{}] No valid slug provided, skipping API call", filename);
            return LookupResult::Unresolved;
        }
        let slug = slug.trim();

        let endpoint = self.project_endpoint(slug);
        debug!("[{}] Requesting data from: {}", filename, endpoint);

        let response = match self.client.get(endpoint).send().await {
            Ok(response) => response,
            Err(e) => {
                let reason = self.describe_transport_error(&e);
                warn!("[{}] Error fetching data for {}: {}", filename, slug, reason);
                return LookupResult::Failed { reason };
            }
        };

        match response.status() {
            StatusCode::OK => match response.json::<ProjectResponse>().await {
                Ok(project) => {
                    let client_side = Compat::parse(project.client_side.as_deref().unwrap_or(""));
                    let server_side = Compat::parse(project.server_side.as_deref().unwrap_or(""));
                    info!(
                        "[{}] Successfully retrieved data for {}: {}/{}",
                        filename, slug, client_side, server_side
                    );
                    LookupResult::Found {
                        title: project.title.unwrap_or_default(),
                        url: self.project_url(slug),
                        client_side,
                        server_side,
                    }
                }
                Err(e) => {
                    warn!("[{}] Malformed response for {}: {}", filename, slug, e);
                    LookupResult::Failed {
                        reason: format!("Malformed response: {e}"),
                    }
                }
            },
            StatusCode::NOT_FOUND => {
                warn!(
                    "[{}] Mod slug '{}' not found on Modrinth (404)",
                    filename, slug
                );
                LookupResult::NotFound
            }
            status => {
                warn!(
                    "[{}] API request for {} failed with status code {}",
                    filename,
                    slug,
                    status.as_u16()
                );
                LookupResult::Failed {
                    reason: format!("HTTP {status}"),
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "modrinth"
    }
}
