use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use exam_core::countdown::{Countdown, Tick};
use exam_core::model::{AnswerLedger, Exam, Question, QuestionId, ScoreReport};

use crate::error::SessionError;

//
// ─── TICK OUTCOME ──────────────────────────────────────────────────────────────
//

/// What delivering one second of elapsed time meant for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session is submitted or the clock is stopped; nothing happened.
    Ignored,
    /// Still in progress with this many seconds left.
    Running { remaining: u32 },
    /// The clock hit zero on this tick and the session auto-submitted.
    Expired,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at an exam, from start to submission.
///
/// Owns the full session state: the current question index, the answer
/// ledger, the countdown, and (after submission) the frozen score report.
/// All transitions happen on discrete events delivered by the caller; the
/// session itself never spawns timers or touches storage.
pub struct ExamSession {
    exam: Arc<Exam>,
    current_index: usize,
    ledger: AnswerLedger,
    countdown: Countdown,
    report: Option<ScoreReport>,
    started_at: DateTime<Utc>,
    hidden_count: u32,
}

impl ExamSession {
    /// Start a fresh attempt with the exam's full time budget.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Countdown` if the exam duration is zero, which
    /// a validated `Exam` rules out.
    pub fn start(exam: Arc<Exam>, now: DateTime<Utc>) -> Result<Self, SessionError> {
        let mut countdown = Countdown::new();
        countdown.start(exam.duration_secs())?;

        Ok(Self {
            exam,
            current_index: 0,
            ledger: AnswerLedger::new(),
            countdown,
            report: None,
            started_at: now,
            hidden_count: 0,
        })
    }

    /// Resume an interrupted attempt from persisted state.
    ///
    /// Saved answers that no longer match the exam are dropped silently. A
    /// saved time of zero (or one exceeding the exam duration) is stale;
    /// the attempt restarts with the full budget rather than expiring on
    /// arrival.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Countdown` if the exam duration is zero.
    pub fn resume(
        exam: Arc<Exam>,
        saved_answers: Vec<(QuestionId, usize)>,
        remaining_secs: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let ledger = AnswerLedger::restore(&exam, saved_answers);
        let initial = if remaining_secs == 0 || remaining_secs > exam.duration_secs() {
            exam.duration_secs()
        } else {
            remaining_secs
        };

        let mut countdown = Countdown::new();
        countdown.start(initial)?;

        Ok(Self {
            exam,
            current_index: 0,
            ledger,
            countdown,
            report: None,
            started_at: now,
            hidden_count: 0,
        })
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn exam(&self) -> &Exam {
        &self.exam
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question currently shown. The index is always in bounds.
    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.exam.questions()[self.current_index]
    }

    #[must_use]
    pub fn ledger(&self) -> &AnswerLedger {
        &self.ledger
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.exam.total_count()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.ledger.answered_count()
    }

    /// Share of questions answered, for the progress bar. Distinct from the
    /// score percentage.
    #[must_use]
    pub fn completion_percent(&self) -> u32 {
        let total = self.exam.total_count();
        if total == 0 {
            return 0;
        }
        ((self.ledger.answered_count() * 100) / total) as u32
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining()
    }

    #[must_use]
    pub fn is_low_time(&self) -> bool {
        self.countdown.is_low()
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.report.is_some()
    }

    /// The frozen score report, present once submitted.
    #[must_use]
    pub fn report(&self) -> Option<&ScoreReport> {
        self.report.as_ref()
    }

    /// How many times focus was lost while in progress.
    #[must_use]
    pub fn hidden_count(&self) -> u32 {
        self.hidden_count
    }

    /// Answer map snapshot for write-through persistence.
    #[must_use]
    pub fn snapshot_answers(&self) -> Vec<(QuestionId, usize)> {
        self.ledger.entries().collect()
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────
    //

    /// Record a selection for any question in the exam.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` after submission and
    /// `SessionError::Selection` for an unknown question or option; the
    /// session is unchanged on error.
    pub fn select_answer(
        &mut self,
        question_id: QuestionId,
        option_index: usize,
    ) -> Result<(), SessionError> {
        if self.is_submitted() {
            return Err(SessionError::AlreadySubmitted);
        }
        self.ledger.select(&self.exam, question_id, option_index)?;
        Ok(())
    }

    /// Record a selection for the question currently shown.
    ///
    /// # Errors
    ///
    /// Same contract as [`ExamSession::select_answer`].
    pub fn select_for_current(&mut self, option_index: usize) -> Result<(), SessionError> {
        let id = self.current_question().id();
        self.select_answer(id, option_index)
    }

    /// Move to the next question; a no-op at the last one.
    pub fn next(&mut self) {
        if self.current_index + 1 < self.exam.total_count() {
            self.current_index += 1;
        }
    }

    /// Move to the previous question; a no-op at the first one.
    pub fn previous(&mut self) {
        self.current_index = self.current_index.saturating_sub(1);
    }

    /// Jump straight to a question by position; out-of-range is a no-op.
    pub fn jump_to(&mut self, index: usize) {
        if index < self.exam.total_count() {
            self.current_index = index;
        }
    }

    /// Deliver one one-second tick.
    ///
    /// The tick that crosses zero finalizes the session in the same event:
    /// by the time `TickOutcome::Expired` is returned the report is frozen
    /// and later manual submits fail with `AlreadySubmitted`. The caller is
    /// responsible for clearing persisted state.
    pub fn tick(&mut self) -> TickOutcome {
        if self.is_submitted() {
            return TickOutcome::Ignored;
        }
        match self.countdown.tick() {
            Tick::Idle => TickOutcome::Ignored,
            Tick::Running { remaining } => TickOutcome::Running { remaining },
            Tick::Expired => {
                self.finalize();
                TickOutcome::Expired
            }
        }
    }

    /// Submit manually. Stops the clock first, so a pending expiry can never
    /// fire for this attempt, then freezes the score report.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` on a second submit or after
    /// expiry.
    pub fn submit(&mut self) -> Result<&ScoreReport, SessionError> {
        if self.is_submitted() {
            return Err(SessionError::AlreadySubmitted);
        }
        self.countdown.stop();
        self.finalize();
        self.report.as_ref().ok_or(SessionError::AlreadySubmitted)
    }

    /// Note that the window lost foreground visibility.
    ///
    /// Counted only while in progress; never changes the session phase.
    /// Returns the running count for the warning banner.
    pub fn note_hidden(&mut self) -> u32 {
        if !self.is_submitted() {
            self.hidden_count += 1;
        }
        self.hidden_count
    }

    /// Begin a new attempt: empty ledger, full clock, first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Countdown` if the exam duration is zero.
    pub fn restart(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.countdown = Countdown::new();
        self.countdown.start(self.exam.duration_secs())?;
        self.current_index = 0;
        self.ledger.clear();
        self.report = None;
        self.started_at = now;
        self.hidden_count = 0;
        Ok(())
    }

    fn finalize(&mut self) {
        self.report = Some(ScoreReport::compute(&self.exam, &self.ledger));
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("exam_id", &self.exam.id())
            .field("current_index", &self.current_index)
            .field("answered", &self.ledger.answered_count())
            .field("remaining_secs", &self.countdown.remaining())
            .field("submitted", &self.is_submitted())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{ExamId, Question};
    use exam_core::time::fixed_now;

    fn exam(total: u32, duration_secs: u32) -> Arc<Exam> {
        let questions = (1..=total)
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

    #[test]
    fn starts_at_first_question_with_full_clock() {
        let session = ExamSession::start(exam(3, 600), fixed_now()).unwrap();

        assert_eq!(session.current_index(), 0);
        assert_eq!(session.remaining_secs(), 600);
        assert_eq!(session.answered_count(), 0);
        assert!(!session.is_submitted());
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut session = ExamSession::start(exam(3, 600), fixed_now()).unwrap();

        session.previous();
        assert_eq!(session.current_index(), 0);

        session.next();
        session.next();
        assert_eq!(session.current_index(), 2);
        session.next();
        assert_eq!(session.current_index(), 2);

        session.jump_to(1);
        assert_eq!(session.current_index(), 1);
        session.jump_to(99);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn select_for_current_targets_the_shown_question() {
        let mut session = ExamSession::start(exam(3, 600), fixed_now()).unwrap();

        session.next();
        session.select_for_current(2).unwrap();
        assert_eq!(session.ledger().get(QuestionId::new(2)), Some(2));
        assert_eq!(session.completion_percent(), 33);
    }

    #[test]
    fn expiry_tick_auto_submits() {
        let mut session = ExamSession::start(exam(3, 5), fixed_now()).unwrap();
        session.select_answer(QuestionId::new(1), 0).unwrap();

        for _ in 0..4 {
            assert!(matches!(session.tick(), TickOutcome::Running { .. }));
        }
        assert_eq!(session.tick(), TickOutcome::Expired);

        assert!(session.is_submitted());
        let report = session.report().unwrap();
        assert_eq!(report.correct_count(), 1);
        assert_eq!(report.percentage(), 33);

        // Further ticks and submits are inert.
        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert!(matches!(
            session.submit(),
            Err(SessionError::AlreadySubmitted)
        ));
    }

    #[test]
    fn manual_submit_stops_the_clock_and_freezes_the_report() {
        let mut session = ExamSession::start(exam(3, 600), fixed_now()).unwrap();
        session.select_answer(QuestionId::new(1), 0).unwrap();

        let report = session.submit().unwrap().clone();
        assert_eq!(report.correct_count(), 1);

        // No expiry can fire after a manual submit.
        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert_eq!(session.remaining_secs(), 600);

        // Selections after submission are rejected and the report unchanged.
        assert!(matches!(
            session.select_answer(QuestionId::new(2), 1),
            Err(SessionError::AlreadySubmitted)
        ));
        assert_eq!(session.report(), Some(&report));
    }

    #[test]
    fn hidden_events_count_but_never_change_phase() {
        let mut session = ExamSession::start(exam(3, 600), fixed_now()).unwrap();

        assert_eq!(session.note_hidden(), 1);
        assert_eq!(session.note_hidden(), 2);
        assert!(!session.is_submitted());

        session.submit().unwrap();
        assert_eq!(session.note_hidden(), 2);
    }

    #[test]
    fn restart_reinitializes_every_field() {
        let mut session = ExamSession::start(exam(3, 10), fixed_now()).unwrap();
        session.select_answer(QuestionId::new(1), 1).unwrap();
        session.next();
        session.tick();
        session.submit().unwrap();

        let later = fixed_now() + chrono::Duration::minutes(5);
        session.restart(later).unwrap();

        assert_eq!(session.current_index(), 0);
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.remaining_secs(), 10);
        assert_eq!(session.started_at(), later);
        assert!(!session.is_submitted());
    }

    #[test]
    fn resume_restores_ledger_and_clock() {
        let session = ExamSession::resume(
            exam(3, 600),
            vec![(QuestionId::new(1), 0), (QuestionId::new(3), 2)],
            123,
            fixed_now(),
        )
        .unwrap();

        assert_eq!(session.answered_count(), 2);
        assert_eq!(session.remaining_secs(), 123);
    }

    #[test]
    fn resume_with_stale_time_restarts_the_clock() {
        let zero = ExamSession::resume(exam(3, 600), Vec::new(), 0, fixed_now()).unwrap();
        assert_eq!(zero.remaining_secs(), 600);

        let oversized = ExamSession::resume(exam(3, 600), Vec::new(), 9_999, fixed_now()).unwrap();
        assert_eq!(oversized.remaining_secs(), 600);
    }
}
