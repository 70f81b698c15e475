//! In-memory `IssueTracker` that records every call.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use super::{
    Comment, Credential, Issue, IssueLabel, IssuePatch, IssueQuery, IssueState, IssueTracker,
    NewIssue,
};
use crate::errors::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateIssue(NewIssue),
    ListIssues(IssueQuery),
    CreateComment { number: u64, body: String },
    UpdateIssue { number: u64, patch: IssuePatch },
}

#[derive(Default)]
pub struct MockTracker {
    calls: Mutex<Vec<Call>>,
    issues: Mutex<Vec<Issue>>,
    fail_reads: bool,
    fail_writes: Option<(u16, String)>,
    fail_comments: bool,
}

impl MockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every listing fails as if the service were unavailable.
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Every create/patch/comment fails with the given status and body.
    pub fn failing_writes(status: u16, body: &str) -> Self {
        Self {
            fail_writes: Some((status, body.to_string())),
            ..Self::default()
        }
    }

    /// Comments fail; issue creation and patches succeed.
    pub fn failing_comments() -> Self {
        Self {
            fail_comments: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn issues(&self) -> Vec<Issue> {
        self.issues.lock().unwrap().clone()
    }

    /// Seed an issue as if created out of band (hand-written or legacy).
    pub fn seed(&self, title: &str, body: &str, labels: &[&str], state: IssueState) -> u64 {
        let mut issues = self.issues.lock().unwrap();
        let number = issues.len() as u64 + 1;
        issues.push(Issue {
            number,
            title: title.to_string(),
            body: Some(body.to_string()),
            labels: to_labels(labels.iter().map(|l| l.to_string())),
            state,
            comments: 0,
            created_at: created_at(number),
            html_url: format!("https://github.com/o/r/issues/{}", number),
            pull_request: None,
        });
        number
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_write(&self) -> Result<(), StoreError> {
        match &self.fail_writes {
            Some((status, body)) => Err(StoreError::RemoteWrite {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }

    fn not_found() -> StoreError {
        StoreError::RemoteWrite {
            status: 404,
            body: r#"{"message":"Not Found"}"#.to_string(),
        }
    }
}

fn to_labels(names: impl IntoIterator<Item = String>) -> Vec<IssueLabel> {
    names.into_iter().map(|name| IssueLabel { name }).collect()
}

fn created_at(number: u64) -> DateTime<Utc> {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    base + Duration::minutes(number as i64)
}

#[async_trait]
impl IssueTracker for MockTracker {
    async fn create_issue(
        &self,
        _credential: &Credential,
        issue: &NewIssue,
    ) -> Result<Issue, StoreError> {
        self.record(Call::CreateIssue(issue.clone()));
        self.check_write()?;

        let mut issues = self.issues.lock().unwrap();
        let number = issues.len() as u64 + 1;
        let created = Issue {
            number,
            title: issue.title.clone(),
            body: Some(issue.body.clone()),
            labels: to_labels(issue.labels.iter().cloned()),
            state: IssueState::Open,
            comments: 0,
            created_at: created_at(number),
            html_url: format!("https://github.com/o/r/issues/{}", number),
            pull_request: None,
        };
        issues.push(created.clone());
        Ok(created)
    }

    async fn list_issues(
        &self,
        _credential: &Credential,
        query: &IssueQuery,
    ) -> Result<Vec<Issue>, StoreError> {
        self.record(Call::ListIssues(query.clone()));
        if self.fail_reads {
            return Err(StoreError::RemoteWrite {
                status: 503,
                body: "Service Unavailable".to_string(),
            });
        }

        let mut matching: Vec<Issue> = self
            .issues
            .lock()
            .unwrap()
            .iter()
            .filter(|i| query.state.matches(i.state))
            .filter(|i| query.labels.iter().all(|l| i.has_label(l)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn create_comment(
        &self,
        _credential: &Credential,
        number: u64,
        body: &str,
    ) -> Result<Comment, StoreError> {
        self.record(Call::CreateComment {
            number,
            body: body.to_string(),
        });
        self.check_write()?;
        if self.fail_comments {
            return Err(StoreError::RemoteWrite {
                status: 500,
                body: "comment failed".to_string(),
            });
        }

        let mut issues = self.issues.lock().unwrap();
        let issue = issues
            .iter_mut()
            .find(|i| i.number == number)
            .ok_or_else(Self::not_found)?;
        issue.comments += 1;
        Ok(Comment {
            id: u64::from(issue.comments),
            body: Some(body.to_string()),
            html_url: format!("{}#comment-{}", issue.html_url, issue.comments),
        })
    }

    async fn update_issue(
        &self,
        _credential: &Credential,
        number: u64,
        patch: &IssuePatch,
    ) -> Result<Issue, StoreError> {
        self.record(Call::UpdateIssue {
            number,
            patch: patch.clone(),
        });
        self.check_write()?;

        let mut issues = self.issues.lock().unwrap();
        let issue = issues
            .iter_mut()
            .find(|i| i.number == number)
            .ok_or_else(Self::not_found)?;
        if let Some(state) = patch.state {
            issue.state = state;
        }
        if let Some(labels) = &patch.labels {
            issue.labels = to_labels(labels.iter().cloned());
        }
        Ok(issue.clone())
    }
}
