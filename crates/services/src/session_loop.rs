use std::sync::Arc;

use exam_core::model::{Exam, QuestionId, ScoreReport};
use storage::repository::{InMemoryRepository, ProgressRepository};

use crate::error::SessionError;
use crate::session_service::{ExamSession, TickOutcome};
use crate::Clock;

/// Orchestrates a session against the progress store.
///
/// Every mutation writes through: the answer map on each selection, the
/// remaining time on each tick. Submission and expiry clear both persisted
/// keys; a later `start_session` then begins fresh.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, progress }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(clock, Arc::new(InMemoryRepository::new()))
    }

    /// Start a session for the exam, resuming saved progress when the store
    /// holds a readable pair. A corrupted or half-written store silently
    /// starts a fresh attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for store access failures or a zero-duration
    /// exam.
    pub async fn start_session(&self, exam: Arc<Exam>) -> Result<ExamSession, SessionError> {
        match self.progress.load().await? {
            Some(saved) => ExamSession::resume(
                exam,
                saved.answers,
                saved.remaining_secs,
                self.clock.now(),
            ),
            None => ExamSession::start(exam, self.clock.now()),
        }
    }

    /// Record a selection and persist the updated answer map.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for invalid selections, a submitted session,
    /// or a failed write. The in-memory selection is applied before the
    /// write, so a store failure loses durability, not the answer.
    pub async fn select_answer(
        &self,
        session: &mut ExamSession,
        question_id: QuestionId,
        option_index: usize,
    ) -> Result<(), SessionError> {
        session.select_answer(question_id, option_index)?;
        self.progress.save_answers(&session.snapshot_answers()).await?;
        Ok(())
    }

    /// Deliver one second of elapsed time and persist what it implies:
    /// the new remaining time while running, or a cleared store when this
    /// tick expired (and auto-submitted) the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the write-through fails.
    pub async fn tick(&self, session: &mut ExamSession) -> Result<TickOutcome, SessionError> {
        let outcome = session.tick();
        match outcome {
            TickOutcome::Running { remaining } => self.progress.save_time(remaining).await?,
            TickOutcome::Expired => self.progress.clear().await?,
            TickOutcome::Ignored => {}
        }
        Ok(outcome)
    }

    /// Submit manually (after the confirmation dialog) and clear the
    /// persisted pair.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` on a double submit, or
    /// `SessionError::Storage` when clearing fails.
    pub async fn submit(&self, session: &mut ExamSession) -> Result<ScoreReport, SessionError> {
        let report = session.submit()?.clone();
        self.progress.clear().await?;
        Ok(report)
    }

    /// Throw the attempt away and start over: fresh ledger, full clock,
    /// empty store.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if re-initialization or the store delete
    /// fails.
    pub async fn restart(&self, session: &mut ExamSession) -> Result<(), SessionError> {
        session.restart(self.clock.now())?;
        self.progress.clear().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{ExamId, Question};
    use exam_core::time::fixed_clock;

    fn exam(duration_secs: u32) -> Arc<Exam> {
        let questions = (1..=3_u32)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    vec!["a".into(), "b".into(), "c".into()],
                    0,
                )
                .unwrap()
            })
            .collect();
        Arc::new(Exam::new(ExamId::new(1), "Test", None, duration_secs, questions).unwrap())
    }

    #[tokio::test]
    async fn selections_write_through_and_resume() {
        let repo = Arc::new(InMemoryRepository::new());
        let loop_svc = SessionLoopService::new(fixed_clock(), repo.clone());

        let mut session = loop_svc.start_session(exam(600)).await.unwrap();
        loop_svc
            .select_answer(&mut session, QuestionId::new(1), 2)
            .await
            .unwrap();
        loop_svc.tick(&mut session).await.unwrap();

        // A second start picks the interrupted attempt back up.
        let resumed = loop_svc.start_session(exam(600)).await.unwrap();
        assert_eq!(resumed.ledger().get(QuestionId::new(1)), Some(2));
        assert_eq!(resumed.remaining_secs(), 599);
    }

    #[tokio::test]
    async fn manual_submit_clears_the_store() {
        let repo = Arc::new(InMemoryRepository::new());
        let loop_svc = SessionLoopService::new(fixed_clock(), repo.clone());

        let mut session = loop_svc.start_session(exam(600)).await.unwrap();
        loop_svc
            .select_answer(&mut session, QuestionId::new(1), 0)
            .await
            .unwrap();
        loop_svc.tick(&mut session).await.unwrap();

        let report = loop_svc.submit(&mut session).await.unwrap();
        assert_eq!(report.correct_count(), 1);
        assert!(repo.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expiry_auto_submits_and_clears_the_store() {
        let repo = Arc::new(InMemoryRepository::new());
        let loop_svc = SessionLoopService::new(fixed_clock(), repo.clone());

        let mut session = loop_svc.start_session(exam(5)).await.unwrap();
        for _ in 0..4 {
            let outcome = loop_svc.tick(&mut session).await.unwrap();
            assert!(matches!(outcome, TickOutcome::Running { .. }));
        }

        let outcome = loop_svc.tick(&mut session).await.unwrap();
        assert_eq!(outcome, TickOutcome::Expired);
        assert!(session.is_submitted());
        assert!(repo.load().await.unwrap().is_none());
    }
}
