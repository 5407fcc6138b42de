//! GitHub REST implementation of [`HostingApi`].

use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK};
use serde::Deserialize;
use url::Url;

use super::{HostingApi, NewPullRequest, PullRequest, RepoPage, Repository, next_link};
use crate::error::HostingError;

const ACCEPT_GITHUB_V3: &str = "application/vnd.github.v3+json";
const PER_PAGE: &str = "100";

/// `contents` endpoint payload.
#[derive(Debug, Deserialize)]
struct ContentPayload {
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// Client for one GitHub organization.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base: Url,
    org: String,
}

impl GitHubClient {
    /// Build a client sending the fixed user agent, the v3 accept header and,
    /// when a token is given, a bearer authorization header.
    pub fn new(
        api_base: &str,
        org: impl Into<String>,
        user_agent: &str,
        token: Option<&str>,
    ) -> anyhow::Result<Self> {
        let base =
            Url::parse(api_base).with_context(|| format!("Invalid API base URL: {api_base}"))?;
        if base.cannot_be_a_base() {
            return Err(HostingError::InvalidUrl(api_base.to_string()).into());
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_GITHUB_V3));
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .context("GitHub token contains invalid header characters")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base,
            org: org.into(),
        })
    }

    /// Join `path` onto the API base, keeping any base path prefix.
    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}/{path}"));
        url
    }

    /// Point a pagination link at the configured API host.
    fn rebase(&self, link: &str) -> Result<Url, HostingError> {
        let link = Url::parse(link).map_err(|_| HostingError::InvalidUrl(link.to_string()))?;
        let mut url = self.base.clone();
        url.set_path(link.path());
        url.set_query(link.query());
        Ok(url)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<reqwest::Response, HostingError> {
        tracing::debug!(%url, "GitHub request");
        request.send().await.map_err(|source| HostingError::Request {
            url: url.to_string(),
            source,
        })
    }

    async fn expect_status(
        operation: &'static str,
        response: reqwest::Response,
        expected: fn(StatusCode) -> bool,
    ) -> Result<reqwest::Response, HostingError> {
        let status = response.status();
        if expected(status) {
            return Ok(response);
        }
        let body = Self::read_body(response).await;
        tracing::warn!(operation, status = status.as_u16(), %body, "Unexpected GitHub response");
        Err(HostingError::UnexpectedStatus {
            operation,
            status: status.as_u16(),
            body,
        })
    }

    /// Response body for diagnostics; a failed read is described in place.
    async fn read_body(response: reqwest::Response) -> String {
        match response.text().await {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!(error = %err, "Failed to read GitHub response body");
                format!("<unreadable body: {err}>")
            }
        }
    }

    async fn decode_json<T: serde::de::DeserializeOwned>(
        what: &str,
        response: reqwest::Response,
    ) -> Result<T, HostingError> {
        response.json().await.map_err(|e| HostingError::Decode {
            what: what.to_string(),
            source: Box::new(e),
        })
    }
}

#[async_trait]
impl HostingApi for GitHubClient {
    async fn list_repos(&self, page_url: Option<&str>) -> Result<RepoPage, HostingError> {
        let url = match page_url {
            Some(link) => self.rebase(link)?,
            None => {
                let mut url = self.endpoint(&format!("orgs/{}/repos", self.org));
                url.query_pairs_mut()
                    .append_pair("type", "public")
                    .append_pair("sort", "full_name")
                    .append_pair("per_page", PER_PAGE);
                url
            }
        };

        let response = self.send(self.http.get(url.clone()), &url).await?;
        let response =
            Self::expect_status("list repositories", response, |s| s.is_success()).await?;
        let next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_link);
        let repos: Vec<Repository> = Self::decode_json("repository listing", response).await?;

        Ok(RepoPage { repos, next })
    }

    async fn fetch_manifest(&self, repo: &str) -> Result<serde_json::Value, HostingError> {
        let url = self.endpoint(&format!(
            "repos/{}/{}/contents/package.json",
            self.org, repo
        ));
        let response = self.send(self.http.get(url.clone()), &url).await?;
        let response =
            Self::expect_status("fetch package.json", response, |s| s.is_success()).await?;
        let payload: ContentPayload = Self::decode_json("contents payload", response).await?;

        if let Some(encoding) = payload.encoding.as_deref()
            && encoding != "base64"
        {
            return Err(HostingError::Decode {
                what: format!("package.json of {repo}"),
                source: format!("unsupported content encoding '{encoding}'").into(),
            });
        }

        let compact: String = payload
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| HostingError::Decode {
                what: format!("package.json of {repo}"),
                source: Box::new(e),
            })?;
        serde_json::from_slice(&bytes).map_err(|e| HostingError::Decode {
            what: format!("package.json of {repo}"),
            source: Box::new(e),
        })
    }

    async fn create_pull_request(
        &self,
        repo: &str,
        request: &NewPullRequest,
    ) -> Result<PullRequest, HostingError> {
        let url = self.endpoint(&format!("repos/{}/{}/pulls", self.org, repo));
        let response = self
            .send(self.http.post(url.clone()).json(request), &url)
            .await?;
        let response =
            Self::expect_status("pr create", response, |s| s == StatusCode::CREATED).await?;
        Self::decode_json("pull request", response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> GitHubClient {
        GitHubClient::new(base, "fastify", "fastify/deprecator", Some("t0ken")).unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_prefix() {
        let gh = client("https://ghe.example.com/api/v3/");
        assert_eq!(
            gh.endpoint("repos/fastify/fastify-cookie/pulls").as_str(),
            "https://ghe.example.com/api/v3/repos/fastify/fastify-cookie/pulls"
        );
    }

    #[test]
    fn test_rebase_keeps_path_and_query() {
        let gh = client("http://127.0.0.1:4000");
        let url = gh
            .rebase("https://api.github.com/organizations/24939410/repos?page=2")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:4000/organizations/24939410/repos?page=2"
        );
    }

    #[test]
    fn test_invalid_base() {
        assert!(GitHubClient::new("not a url", "fastify", "ua", None).is_err());
    }
}
