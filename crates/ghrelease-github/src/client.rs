//! GitHub REST client implementing the tracker traits.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use ghrelease_core::{
    CancellationToken, Commit, CommitRange, GitHubRepository, IssueTracker, NewRelease, Release,
    ReleaseApi, ReleaseAsset, ReleaseChanges, RemoteIssue,
};

use crate::error::GitHubError;
use crate::models::{
    ApiErrorWire, AssetWire, CompareWire, CreateReleaseWire, IssueWire, ReleaseWire,
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_UPLOADS_URL: &str = "https://uploads.github.com";

const PER_PAGE: usize = 100;
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("ghrelease/", env!("CARGO_PKG_VERSION"));

type Result<T> = std::result::Result<T, GitHubError>;

/// Connection settings.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub api_url: String,
    pub uploads_url: String,
    pub timeout: Duration,
}

impl GitHubConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            uploads_url: DEFAULT_UPLOADS_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Settings from `GITHUB_TOKEN`, with optional `GITHUB_API_URL` and
    /// `GITHUB_UPLOADS_URL` overrides.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN")
            .map_err(|_| GitHubError::Config("GITHUB_TOKEN is not set".to_string()))?;
        let mut config = Self::new(token);
        if let Ok(api_url) = std::env::var("GITHUB_API_URL") {
            config.api_url = api_url;
        }
        if let Ok(uploads_url) = std::env::var("GITHUB_UPLOADS_URL") {
            config.uploads_url = uploads_url;
        }
        Ok(config)
    }
}

/// Client bound to one repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    config: GitHubConfig,
    repository: GitHubRepository,
}

impl GitHubClient {
    pub fn new(repository: GitHubRepository, config: GitHubConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(GitHubError::Config(
                "a GitHub token is required".to_string(),
            ));
        }
        Url::parse(&config.api_url)
            .map_err(|e| GitHubError::Config(format!("invalid API URL {}: {e}", config.api_url)))?;
        Url::parse(&config.uploads_url).map_err(|e| {
            GitHubError::Config(format!("invalid uploads URL {}: {e}", config.uploads_url))
        })?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.trim()))
            .map_err(|_| GitHubError::Config("token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            repository,
        })
    }

    /// `{api_url}/repos/{owner}/{name}/{segments...}`
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        repo_url(&self.config.api_url, &self.repository, segments)
    }

    /// Send and classify the response. Not-found statuses yield `None`.
    async fn send(&self, request: RequestBuilder) -> Result<Option<Response>> {
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }
        Ok(Some(response))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        debug!(%url, "GET");
        match self.send(self.http.get(url)).await? {
            Some(response) => Ok(Some(parse_json(response).await?)),
            None => Ok(None),
        }
    }

    /// Follow `page` until a short page. `None` when the first page is
    /// not found.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<Option<Vec<T>>> {
        let mut items = Vec::new();
        for page in 1.. {
            let mut url = self.endpoint(segments)?;
            url.query_pairs_mut()
                .append_pair("per_page", &PER_PAGE.to_string())
                .append_pair("page", &page.to_string());
            let Some(batch) = self.get_json::<Vec<T>>(url).await? else {
                return Ok((page > 1).then_some(items));
            };
            let done = batch.len() < PER_PAGE;
            items.extend(batch);
            if done {
                break;
            }
        }
        Ok(Some(items))
    }

    async fn delete(&self, url: Url) -> Result<bool> {
        debug!(%url, "DELETE");
        Ok(self.send(self.http.delete(url)).await?.is_some())
    }

    async fn compare(
        &self,
        range: &CommitRange,
        cancel: &CancellationToken,
    ) -> Result<Vec<Commit>> {
        let basehead = format!("{}...{}", range.base, range.head);
        let mut commits = Vec::new();
        let mut base_commit = None;
        for page in 1.. {
            if cancel.is_cancelled() {
                return Err(GitHubError::Cancelled);
            }
            let mut url = self.endpoint(&["compare", &basehead])?;
            url.query_pairs_mut()
                .append_pair("per_page", &PER_PAGE.to_string())
                .append_pair("page", &page.to_string());
            let compare: CompareWire =
                self.get_json(url).await?.ok_or_else(|| GitHubError::Api {
                    status: StatusCode::NOT_FOUND.as_u16(),
                    message: format!("cannot compare {basehead}"),
                })?;
            let total = compare.total_commits;
            let received = compare.commits.len();
            base_commit.get_or_insert(compare.base_commit);
            commits.extend(compare.commits.into_iter().map(Commit::from));
            if received == 0 || commits.len() >= total {
                break;
            }
        }
        debug!(base = %range.base, head = %range.head, count = commits.len(), "compared commits");
        if range.include_base {
            if let Some(base) = base_commit {
                commits.insert(0, Commit::from(base));
            }
        }
        Ok(commits)
    }

    async fn find_release_by_tag(&self, tag: &str) -> Result<Option<Release>> {
        let url = self.endpoint(&["releases", "tags", tag])?;
        if let Some(release) = self.get_json::<ReleaseWire>(url).await? {
            return Ok(Some(release.into()));
        }
        // Drafts have no tag yet and are only visible in the listing.
        let releases: Vec<ReleaseWire> = self
            .get_all_pages(&["releases"])
            .await?
            .unwrap_or_default();
        Ok(releases
            .into_iter()
            .find(|r| r.tag_name == tag)
            .map(Into::into))
    }

    fn upload_url(&self, release: &Release, name: &str) -> Result<Url> {
        let mut url = match strip_url_template(&release.upload_url) {
            Some(template) => Url::parse(template)
                .map_err(|e| GitHubError::Config(format!("invalid upload URL: {e}")))?,
            None => repo_url(
                &self.config.uploads_url,
                &self.repository,
                &["releases", &release.id.to_string(), "assets"],
            )?,
        };
        url.query_pairs_mut().append_pair("name", name);
        Ok(url)
    }
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn list_commits(
        &self,
        range: &CommitRange,
        cancel: &CancellationToken,
    ) -> ghrelease_core::Result<Vec<Commit>> {
        self.compare(range, cancel).await.map_err(|e| {
            e.into_release_error("list_commits", format!("{}...{}", range.base, range.head))
        })
    }

    async fn get_issue(&self, number: u64) -> ghrelease_core::Result<Option<RemoteIssue>> {
        let fetch = async {
            let url = self.endpoint(&["issues", &number.to_string()])?;
            Ok::<_, GitHubError>(self.get_json::<IssueWire>(url).await?.map(Into::into))
        };
        fetch
            .await
            .map_err(|e| e.into_release_error("get_issue", number))
    }
}

#[async_trait]
impl ReleaseApi for GitHubClient {
    async fn get_release(&self, id: u64) -> ghrelease_core::Result<Option<Release>> {
        let fetch = async {
            let url = self.endpoint(&["releases", &id.to_string()])?;
            Ok::<_, GitHubError>(self.get_json::<ReleaseWire>(url).await?.map(Into::into))
        };
        fetch.await.map_err(|e| e.into_release_error("get_release", id))
    }

    async fn get_release_by_tag(&self, tag: &str) -> ghrelease_core::Result<Option<Release>> {
        self.find_release_by_tag(tag)
            .await
            .map_err(|e| e.into_release_error("get_release_by_tag", tag))
    }

    async fn list_releases(&self) -> ghrelease_core::Result<Vec<Release>> {
        let fetch = async {
            let releases: Vec<ReleaseWire> =
                self.get_all_pages(&["releases"]).await?.unwrap_or_default();
            Ok::<_, GitHubError>(releases.into_iter().map(Into::into).collect())
        };
        fetch
            .await
            .map_err(|e| e.into_release_error("list_releases", &self.repository))
    }

    async fn create_release(&self, release: &NewRelease) -> ghrelease_core::Result<Release> {
        let create = async {
            let url = self.endpoint(&["releases"])?;
            debug!(%url, tag = %release.tag_name, "POST");
            let request = self.http.post(url).json(&CreateReleaseWire::from(release));
            let response = self.send(request).await?.ok_or_else(|| GitHubError::Api {
                status: StatusCode::NOT_FOUND.as_u16(),
                message: format!("repository {} not found", self.repository),
            })?;
            Ok::<_, GitHubError>(parse_json::<ReleaseWire>(response).await?.into())
        };
        create
            .await
            .map_err(|e| e.into_release_error("create_release", &release.tag_name))
    }

    async fn update_release(
        &self,
        id: u64,
        changes: &ReleaseChanges,
    ) -> ghrelease_core::Result<Option<Release>> {
        let update = async {
            let url = self.endpoint(&["releases", &id.to_string()])?;
            debug!(%url, "PATCH");
            let request = self.http.request(Method::PATCH, url).json(changes);
            match self.send(request).await? {
                Some(response) => Ok(Some(parse_json::<ReleaseWire>(response).await?.into())),
                None => Ok::<_, GitHubError>(None),
            }
        };
        update
            .await
            .map_err(|e| e.into_release_error("update_release", id))
    }

    async fn delete_release(&self, id: u64) -> ghrelease_core::Result<bool> {
        let delete = async {
            let url = self.endpoint(&["releases", &id.to_string()])?;
            self.delete(url).await
        };
        delete
            .await
            .map_err(|e| e.into_release_error("delete_release", id))
    }

    async fn list_assets(
        &self,
        release_id: u64,
    ) -> ghrelease_core::Result<Option<Vec<ReleaseAsset>>> {
        let fetch = async {
            let id = release_id.to_string();
            let assets: Option<Vec<AssetWire>> =
                self.get_all_pages(&["releases", &id, "assets"]).await?;
            Ok::<_, GitHubError>(assets.map(|a| a.into_iter().map(Into::into).collect()))
        };
        fetch
            .await
            .map_err(|e| e.into_release_error("list_assets", release_id))
    }

    async fn upload_asset(
        &self,
        release: &Release,
        name: &str,
        data: Vec<u8>,
    ) -> ghrelease_core::Result<ReleaseAsset> {
        let upload = async {
            let url = self.upload_url(release, name)?;
            debug!(%url, size = data.len(), "POST asset");
            let request = self
                .http
                .post(url)
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(data);
            let response = self.send(request).await?.ok_or_else(|| GitHubError::Api {
                status: StatusCode::NOT_FOUND.as_u16(),
                message: format!("release {} not found", release.id),
            })?;
            Ok::<_, GitHubError>(parse_json::<AssetWire>(response).await?.into())
        };
        upload
            .await
            .map_err(|e| e.into_release_error("upload_asset", name))
    }

    async fn delete_asset(&self, asset_id: u64) -> ghrelease_core::Result<bool> {
        let delete = async {
            let url = self.endpoint(&["releases", "assets", &asset_id.to_string()])?;
            self.delete(url).await
        };
        delete
            .await
            .map_err(|e| e.into_release_error("delete_asset", asset_id))
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn repo_url(base: &str, repository: &GitHubRepository, segments: &[&str]) -> Result<Url> {
    let mut url =
        Url::parse(base).map_err(|e| GitHubError::Config(format!("invalid URL {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| GitHubError::Config(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(["repos", repository.owner.as_str(), repository.name.as_str()])
        .extend(segments);
    Ok(url)
}

/// `https://uploads.github.com/.../assets{?name,label}` without the
/// template suffix. `None` for an empty URL.
fn strip_url_template(url: &str) -> Option<&str> {
    let stripped = match url.find('{') {
        Some(i) => &url[..i],
        None => url,
    };
    (!stripped.is_empty()).then_some(stripped)
}

fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorWire>(body) {
        Ok(error) => error.describe(),
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => body.trim().to_string(),
    }
}
