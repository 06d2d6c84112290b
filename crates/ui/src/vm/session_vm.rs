use std::sync::Arc;

use exam_core::model::{ExamId, ReportFilter};
use exam_core::time::format_seconds;
use services::{CatalogError, ExamSession, SessionLoopService, TickOutcome, catalog};

use crate::views::ViewError;

/// A user action on the running exam, as dispatched from the view layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionIntent {
    Select(usize),
    Next,
    Previous,
    JumpTo(usize),
    Submit,
    Restart,
}

/// One row of the post-submission review list, fully resolved to display
/// strings so the view stays free of model lookups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewRow {
    pub number: usize,
    pub prompt: String,
    pub selected: Option<String>,
    pub correct: String,
    pub is_correct: bool,
}

/// View-model over one exam attempt.
///
/// Owns the session and exposes only display-shaped data; every mutation
/// that must be durable goes through the `SessionLoopService`.
pub struct SessionVm {
    session: ExamSession,
}

impl SessionVm {
    #[must_use]
    pub fn new(session: ExamSession) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.session.exam().title()
    }

    /// Remaining time as `m:ss` for the header clock.
    #[must_use]
    pub fn timer_label(&self) -> String {
        format_seconds(self.session.remaining_secs())
    }

    #[must_use]
    pub fn is_low_time(&self) -> bool {
        self.session.is_low_time()
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.session.is_submitted()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.session.current_index()
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.session.total_count()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.session.answered_count()
    }

    #[must_use]
    pub fn completion_percent(&self) -> u32 {
        self.session.completion_percent()
    }

    #[must_use]
    pub fn hidden_count(&self) -> u32 {
        self.session.hidden_count()
    }

    #[must_use]
    pub fn current_prompt(&self) -> &str {
        self.session.current_question().prompt()
    }

    #[must_use]
    pub fn current_options(&self) -> &[String] {
        self.session.current_question().options()
    }

    /// The option picked for the question currently shown, if any.
    #[must_use]
    pub fn current_selection(&self) -> Option<usize> {
        self.session.ledger().get(self.session.current_question().id())
    }

    /// Whether the question at a navigator position has an answer.
    #[must_use]
    pub fn is_answered_at(&self, index: usize) -> bool {
        self.session
            .exam()
            .questions()
            .get(index)
            .is_some_and(|question| self.session.ledger().is_answered(question.id()))
    }

    #[must_use]
    pub fn score_percentage(&self) -> u32 {
        self.session.report().map_or(0, |report| report.percentage())
    }

    #[must_use]
    pub fn score_correct(&self) -> usize {
        self.session
            .report()
            .map_or(0, |report| report.correct_count())
    }

    #[must_use]
    pub fn score_incorrect(&self) -> usize {
        self.session
            .report()
            .map_or(0, |report| report.incorrect_count())
    }

    /// Review rows matching the active filter, in exam order.
    #[must_use]
    pub fn review_rows(&self, filter: ReportFilter) -> Vec<ReviewRow> {
        let Some(report) = self.session.report() else {
            return Vec::new();
        };
        let exam = self.session.exam();

        report
            .filtered(filter)
            .into_iter()
            .filter_map(|outcome| {
                let question = exam.question(outcome.question_id)?;
                let number = exam.index_of(outcome.question_id)? + 1;
                Some(ReviewRow {
                    number,
                    prompt: question.prompt().to_string(),
                    selected: outcome
                        .selected_option
                        .and_then(|index| question.options().get(index).cloned()),
                    correct: question.options()[question.correct_option()].clone(),
                    is_correct: outcome.is_correct,
                })
            })
            .collect()
    }

    pub fn next(&mut self) {
        self.session.next();
    }

    pub fn previous(&mut self) {
        self.session.previous();
    }

    pub fn jump_to(&mut self, index: usize) {
        self.session.jump_to(index);
    }

    /// Count a window-hidden event; returns the running total for the
    /// warning banner.
    pub fn note_hidden(&mut self) -> u32 {
        self.session.note_hidden()
    }

    /// Pick an option for the question currently shown and persist it.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Unknown` for service failures.
    pub async fn select_current(
        &mut self,
        session_loop: &SessionLoopService,
        option_index: usize,
    ) -> Result<(), ViewError> {
        let question_id = self.session.current_question().id();
        session_loop
            .select_answer(&mut self.session, question_id, option_index)
            .await
            .map_err(|_| ViewError::Unknown)
    }

    /// Deliver one second of elapsed time.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Unknown` for service failures.
    pub async fn tick(
        &mut self,
        session_loop: &SessionLoopService,
    ) -> Result<TickOutcome, ViewError> {
        session_loop
            .tick(&mut self.session)
            .await
            .map_err(|_| ViewError::Unknown)
    }

    /// Submit the attempt and clear saved progress.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Unknown` for service failures, including a
    /// double submit.
    pub async fn submit(&mut self, session_loop: &SessionLoopService) -> Result<(), ViewError> {
        session_loop
            .submit(&mut self.session)
            .await
            .map(|_| ())
            .map_err(|_| ViewError::Unknown)
    }

    /// Throw the attempt away and start over.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Unknown` for service failures.
    pub async fn restart(&mut self, session_loop: &SessionLoopService) -> Result<(), ViewError> {
        session_loop
            .restart(&mut self.session)
            .await
            .map_err(|_| ViewError::Unknown)
    }
}

/// Look up a catalog exam and start (or resume) a session for it.
///
/// # Errors
///
/// Returns `ViewError::UnknownExam` for an id not in the catalog and
/// `ViewError::Unknown` for other failures.
pub async fn start_session(
    session_loop: &SessionLoopService,
    exam_id: ExamId,
) -> Result<SessionVm, ViewError> {
    let exam = match catalog::find_exam(exam_id) {
        Ok(exam) => exam,
        Err(CatalogError::UnknownExam { .. }) => return Err(ViewError::UnknownExam),
        Err(_) => return Err(ViewError::Unknown),
    };

    let session = session_loop
        .start_session(Arc::new(exam))
        .await
        .map_err(|_| ViewError::Unknown)?;

    Ok(SessionVm::new(session))
}
