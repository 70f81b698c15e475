//! Record store: contact messages and orders kept as GitHub issues.
//!
//! Writes propagate every failure. Listings never fail: any error, including
//! a missing credential, is logged and yields an empty list, so callers
//! cannot tell "no records" from "tracker unavailable".
//!
//! Multi-step operations (reply-then-close, relabel-then-comment) issue
//! independent calls. A failure part-way leaves the earlier calls applied.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::GitHubConfig;
use crate::errors::StoreError;
use crate::records::{
    ContactRecord, ContactSubmission, FulfillmentStatus, OrderRecord, OrderSubmission,
    SubmitReceipt, contact, order,
};
use crate::tracker::credentials::EnvCredential;
use crate::tracker::{
    Credential, CredentialProvider, GitHubTracker, IssuePatch, IssueQuery, IssueState,
    IssueTracker, StateFilter,
};

pub struct RecordStore<T> {
    tracker: T,
    credentials: Arc<dyn CredentialProvider>,
}

impl RecordStore<GitHubTracker> {
    /// GitHub-backed store reading its token from `config.token_env`.
    pub fn from_config(config: &GitHubConfig) -> Result<Self, StoreError> {
        let tracker = GitHubTracker::new(config)?;
        Ok(Self::new(
            tracker,
            Arc::new(EnvCredential::new(config.token_env.clone())),
        ))
    }
}

impl<T: IssueTracker> RecordStore<T> {
    pub fn new(tracker: T, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            tracker,
            credentials,
        }
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    fn credential(&self) -> Result<Credential, StoreError> {
        self.credentials
            .credential()
            .ok_or(StoreError::AuthRequired)
    }

    pub async fn submit_contact(
        &self,
        submission: &ContactSubmission,
    ) -> Result<SubmitReceipt, StoreError> {
        let credential = self.credential()?;
        let new_issue = contact::encode(submission, Utc::now())?;
        let issue = self
            .tracker
            .create_issue(&credential, &new_issue)
            .await
            .inspect_err(|e| warn!(error = %e, "failed to save contact"))?;

        info!(issue = issue.number, url = %issue.html_url, "contact saved");
        Ok(SubmitReceipt {
            issue_id: issue.number,
            issue_url: issue.html_url,
        })
    }

    pub async fn list_contacts(&self, state: StateFilter) -> Vec<ContactRecord> {
        match self.fetch(contact::CONTACT_LABEL, state).await {
            Ok(issues) => issues.iter().map(contact::decode).collect(),
            Err(e) => {
                warn!(error = %e, state = %state, "failed to fetch contacts; returning none");
                Vec::new()
            }
        }
    }

    /// Comment on a contact, then optionally close it as resolved.
    pub async fn reply_to_contact(
        &self,
        id: u64,
        message: &str,
        should_close: bool,
    ) -> Result<(), StoreError> {
        let credential = self.credential()?;
        self.tracker
            .create_comment(&credential, id, &contact::reply_comment(message))
            .await
            .inspect_err(|e| warn!(issue = id, error = %e, "failed to reply to contact"))?;

        if should_close {
            let patch = IssuePatch {
                state: Some(IssueState::Closed),
                labels: Some(contact::resolved_labels()),
            };
            self.tracker
                .update_issue(&credential, id, &patch)
                .await
                .inspect_err(|e| warn!(issue = id, error = %e, "reply sent but close failed"))?;
        }

        info!(issue = id, closed = should_close, "contact replied");
        Ok(())
    }

    pub async fn submit_order(
        &self,
        submission: &OrderSubmission,
    ) -> Result<SubmitReceipt, StoreError> {
        let credential = self.credential()?;
        let new_issue = order::encode(submission, Utc::now())?;
        let issue = self
            .tracker
            .create_issue(&credential, &new_issue)
            .await
            .inspect_err(|e| warn!(order_id = %submission.order_id, error = %e, "failed to save order"))?;

        info!(issue = issue.number, order_id = %submission.order_id, url = %issue.html_url, "order saved");
        Ok(SubmitReceipt {
            issue_id: issue.number,
            issue_url: issue.html_url,
        })
    }

    pub async fn list_orders(&self, state: StateFilter) -> Vec<OrderRecord> {
        match self.fetch(order::ORDER_LABEL, state).await {
            Ok(issues) => issues.iter().map(order::decode).collect(),
            Err(e) => {
                warn!(error = %e, state = %state, "failed to fetch orders; returning none");
                Vec::new()
            }
        }
    }

    /// Relabel an order for `status`, closing it for terminal stages, and
    /// comment when `notes` is non-empty. Unknown statuses relabel as
    /// pending; the comment still shows the status as given.
    pub async fn update_order_status(
        &self,
        id: u64,
        status: &str,
        notes: &str,
    ) -> Result<(), StoreError> {
        let credential = self.credential()?;
        let stage = FulfillmentStatus::for_update(status);
        let patch = IssuePatch {
            state: stage.closes_issue().then_some(IssueState::Closed),
            labels: Some(stage.labels()),
        };
        self.tracker
            .update_issue(&credential, id, &patch)
            .await
            .inspect_err(|e| warn!(issue = id, status, error = %e, "failed to update order status"))?;

        if !notes.is_empty() {
            self.tracker
                .create_comment(&credential, id, &order::status_comment(status, notes))
                .await
                .inspect_err(|e| warn!(issue = id, error = %e, "status updated but note failed"))?;
        }

        info!(issue = id, status, stage = %stage, "order status updated");
        Ok(())
    }

    async fn fetch(
        &self,
        label: &str,
        state: StateFilter,
    ) -> Result<Vec<crate::tracker::Issue>, StoreError> {
        let credential = self.credential()?;
        self.tracker
            .list_issues(&credential, &IssueQuery::labelled(label, state))
            .await
    }
}
