//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::countdown::CountdownError;
use exam_core::model::{ExamError, ExamId, QuestionError, SelectionError};
use storage::repository::StorageError;

/// Errors emitted by the exam catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("no exam with id {id} in the catalog")]
    UnknownExam { id: ExamId },

    #[error(transparent)]
    Exam(#[from] ExamError),

    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session already submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Exam(#[from] ExamError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Countdown(#[from] CountdownError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
