//! Complaint intake
//!
//! The HTTP layer only ever talks to a [`ComplaintIntake`]. Intakes return a
//! plain `Result`; mapping that result to a status code and JSON envelope is
//! the handler's job.

use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use thiserror::Error;

/// Message returned when an intake fails without a usable message.
pub const UNKNOWN_FAILURE_MESSAGE: &str = "Erro desconhecido ao criar denúncia";

/// Message returned when a complaint is accepted.
pub const CREATED_MESSAGE: &str = "Denúncia criada com sucesso";

/// A complaint as received over the wire. The body is whatever JSON the
/// client sent; it is neither validated nor stored.
#[derive(Debug, Clone, Default)]
pub struct ComplaintDraft {
    pub body: Option<Value>,
}

/// Acknowledgement that an intake accepted a complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintReceipt {
    pub message: String,
}

impl Default for ComplaintReceipt {
    fn default() -> Self {
        Self {
            message: CREATED_MESSAGE.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComplaintError {
    /// A recognised failure; its message is shown to the client as is.
    #[error("{0}")]
    Rejected(String),

    /// A failure that carries no message worth showing.
    #[error("{}", UNKNOWN_FAILURE_MESSAGE)]
    Unknown,
}

impl ComplaintError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        ComplaintError::Rejected(msg.into())
    }
}

/// Business logic behind `POST .../complaints`.
#[async_trait]
pub trait ComplaintIntake: Send + Sync {
    async fn create(&self, draft: ComplaintDraft) -> Result<ComplaintReceipt, ComplaintError>;
}

/// Intake that accepts every complaint without looking at it.
#[derive(Debug, Clone, Default)]
pub struct AcknowledgingIntake;

#[async_trait]
impl ComplaintIntake for AcknowledgingIntake {
    async fn create(&self, draft: ComplaintDraft) -> Result<ComplaintReceipt, ComplaintError> {
        tracing::debug!(has_body = draft.body.is_some(), "Acknowledging complaint");
        Ok(ComplaintReceipt::default())
    }
}

/// Run an intake, turning a panic inside it into [`ComplaintError::Unknown`].
pub async fn submit(
    intake: &dyn ComplaintIntake,
    draft: ComplaintDraft,
) -> Result<ComplaintReceipt, ComplaintError> {
    match AssertUnwindSafe(intake.create(draft)).catch_unwind().await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!("Complaint intake panicked");
            Err(ComplaintError::Unknown)
        }
    }
}
