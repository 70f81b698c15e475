//! GitHub Issues REST client.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{Comment, Credential, Issue, IssuePatch, IssueQuery, IssueTracker, NewIssue};
use crate::config::GitHubConfig;
use crate::errors::StoreError;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";
const MAX_PER_PAGE: u32 = 100;

/// Issue tracker backed by one GitHub repository.
pub struct GitHubTracker {
    client: reqwest::Client,
    api_base_url: String,
    owner: String,
    repo: String,
    per_page: u32,
}

impl GitHubTracker {
    pub fn new(config: &GitHubConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            per_page: config.per_page.clamp(1, MAX_PER_PAGE),
        })
    }

    /// `owner/repo` slug of the backing repository.
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    fn issues_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/issues",
            self.api_base_url, self.owner, self.repo
        )
    }

    fn issue_url(&self, number: u64) -> String {
        format!("{}/{}", self.issues_url(), number)
    }

    fn request(&self, method: Method, url: &str, credential: &Credential) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(credential.expose())
            .header("Accept", GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    /// Send once and decode the JSON body. Non-2xx responses carry the raw body.
    async fn send<R: DeserializeOwned>(builder: RequestBuilder) -> Result<R, StoreError> {
        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::RemoteWrite {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl IssueTracker for GitHubTracker {
    async fn create_issue(
        &self,
        credential: &Credential,
        issue: &NewIssue,
    ) -> Result<Issue, StoreError> {
        let url = self.issues_url();
        debug!(url = %url, title = %issue.title, "creating issue");
        Self::send(self.request(Method::POST, &url, credential).json(issue)).await
    }

    /// Paginates through all pages automatically.
    async fn list_issues(
        &self,
        credential: &Credential,
        query: &IssueQuery,
    ) -> Result<Vec<Issue>, StoreError> {
        let url = self.issues_url();
        let labels = query.labels.join(",");
        let per_page = self.per_page.to_string();
        let mut all_issues = Vec::new();
        let mut page = 1u32;

        loop {
            debug!(url = %url, labels = %labels, state = %query.state, page, "listing issues");
            let page_param = page.to_string();
            let builder = self.request(Method::GET, &url, credential).query(&[
                ("labels", labels.as_str()),
                ("state", query.state.as_str()),
                ("sort", "created"),
                ("direction", "desc"),
                ("per_page", per_page.as_str()),
                ("page", page_param.as_str()),
            ]);
            let resp: Vec<Issue> = Self::send(builder).await?;

            let count = resp.len();
            all_issues.extend(resp.into_iter().filter(|i| i.pull_request.is_none()));

            if count < self.per_page as usize {
                break;
            }
            page += 1;
        }

        Ok(all_issues)
    }

    async fn create_comment(
        &self,
        credential: &Credential,
        number: u64,
        body: &str,
    ) -> Result<Comment, StoreError> {
        let url = format!("{}/comments", self.issue_url(number));
        debug!(url = %url, "creating comment");
        let payload = serde_json::json!({ "body": body });
        Self::send(self.request(Method::POST, &url, credential).json(&payload)).await
    }

    async fn update_issue(
        &self,
        credential: &Credential,
        number: u64,
        patch: &IssuePatch,
    ) -> Result<Issue, StoreError> {
        let url = self.issue_url(number);
        debug!(url = %url, ?patch, "patching issue");
        Self::send(self.request(Method::PATCH, &url, credential).json(patch)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str) -> GitHubConfig {
        GitHubConfig {
            api_base_url: base.to_string(),
            owner: "owner".to_string(),
            repo: "repo".to_string(),
            ..GitHubConfig::default()
        }
    }

    #[test]
    fn test_trims_trailing_slash() {
        let tracker = GitHubTracker::new(&config("https://api.github.com/")).unwrap();
        assert_eq!(tracker.api_base_url, "https://api.github.com");
        assert_eq!(
            tracker.issues_url(),
            "https://api.github.com/repos/owner/repo/issues"
        );
    }

    #[test]
    fn test_issue_url() {
        let tracker = GitHubTracker::new(&config("https://api.github.com")).unwrap();
        assert_eq!(
            tracker.issue_url(17),
            "https://api.github.com/repos/owner/repo/issues/17"
        );
        assert_eq!(tracker.repo_slug(), "owner/repo");
    }

    #[test]
    fn test_per_page_is_clamped() {
        let mut cfg = config("https://api.github.com");
        cfg.per_page = 0;
        assert_eq!(GitHubTracker::new(&cfg).unwrap().per_page, 1);
        cfg.per_page = 1000;
        assert_eq!(GitHubTracker::new(&cfg).unwrap().per_page, 100);
    }

    #[test]
    fn test_request_sets_bearer_and_github_headers() {
        let tracker = GitHubTracker::new(&config("https://api.github.com")).unwrap();
        let credential = Credential::new("ghp_abc").unwrap();
        let request = tracker
            .request(Method::GET, &tracker.issues_url(), &credential)
            .build()
            .unwrap();
        let headers = request.headers();
        assert_eq!(headers["authorization"], "Bearer ghp_abc");
        assert_eq!(headers["accept"], GITHUB_ACCEPT);
        assert_eq!(headers["x-github-api-version"], GITHUB_API_VERSION);
    }
}
