use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A contact form submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    /// What the visitor is looking to build
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    /// Stamped by the server on arrival
    #[serde(skip_deserializing, default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

/// Fire-and-forget notification about a contact submission.
/// Failures are the caller's to log; they must never fail the request.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, submission: &ContactSubmission) -> anyhow::Result<()>;
}

/// Records submissions in the service log
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, submission: &ContactSubmission) -> anyhow::Result<()> {
        info!(
            name = %submission.name,
            email = %submission.email,
            kind = %submission.kind,
            received_at = %submission.received_at.to_rfc3339(),
            "New contact form submission: {}",
            submission.message
        );
        Ok(())
    }
}
