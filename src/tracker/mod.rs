//! Generic issue-tracker capability.
//!
//! The record store only needs four things from a tracker: create an issue,
//! list issues by label and state, comment on an issue, and patch an issue's
//! state or labels. `IssueTracker` is that seam; `GitHubTracker` is the real
//! implementation.

pub mod credentials;
pub mod github;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::StoreError;
pub use credentials::{Credential, CredentialProvider};
pub use github::GitHubTracker;

/// Lifecycle state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// State filter for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    Open,
    Closed,
    #[default]
    All,
}

impl StateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }

    pub fn matches(&self, state: IssueState) -> bool {
        match self {
            Self::Open => state == IssueState::Open,
            Self::Closed => state == IssueState::Closed,
            Self::All => true,
        }
    }
}

impl std::fmt::Display for StateFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "all" => Ok(Self::All),
            _ => Err(format!("Invalid state filter: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLabel {
    pub name: String,
}

/// A GitHub issue (subset of fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<IssueLabel>,
    pub state: IssueState,
    /// Comment count
    #[serde(default)]
    pub comments: u32,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
    /// Pull requests also come through the issues endpoint; filter them out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn label_names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.name.clone()).collect()
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }

    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}

/// Payload for creating an issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// Partial update for an issue. Unset fields are left untouched upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssuePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<IssueState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

/// Listing query. Results are always newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueQuery {
    pub labels: Vec<String>,
    pub state: StateFilter,
}

impl IssueQuery {
    pub fn labelled(label: &str, state: StateFilter) -> Self {
        Self {
            labels: vec![label.to_string()],
            state,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
}

/// Abstraction over the issue tracker for testability.
/// Real implementation: `GitHubTracker`. Test double: `MockTracker`.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn create_issue(
        &self,
        credential: &Credential,
        issue: &NewIssue,
    ) -> Result<Issue, StoreError>;

    async fn list_issues(
        &self,
        credential: &Credential,
        query: &IssueQuery,
    ) -> Result<Vec<Issue>, StoreError>;

    async fn create_comment(
        &self,
        credential: &Credential,
        number: u64,
        body: &str,
    ) -> Result<Comment, StoreError>;

    async fn update_issue(
        &self,
        credential: &Credential,
        number: u64,
        patch: &IssuePatch,
    ) -> Result<Issue, StoreError>;
}
