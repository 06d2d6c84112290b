use crate::model::exam::Exam;
use crate::model::ids::QuestionId;
use crate::model::ledger::AnswerLedger;

/// Correctness verdict for a single question in a submitted attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    pub is_answered: bool,
    pub is_correct: bool,
    /// What the user picked, for the review screen. `None` when unanswered.
    pub selected_option: Option<usize>,
}

/// Review-screen filter over the per-question outcomes.
///
/// `Incorrect` means answered-and-wrong; unanswered questions only show
/// under `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFilter {
    #[default]
    All,
    Correct,
    Incorrect,
}

/// The computed correctness summary shown after submission.
///
/// Derived data: recomputed on demand from an exam and a ledger snapshot,
/// never stored or mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreReport {
    correct_count: usize,
    total_count: usize,
    percentage: u32,
    per_question: Vec<QuestionOutcome>,
}

impl ScoreReport {
    /// Score a ledger snapshot against an exam.
    ///
    /// Pure and deterministic: calling this twice on the same inputs yields
    /// identical reports. An unanswered question is never correct; the
    /// percentage is round-half-up on the exact rational value.
    #[must_use]
    pub fn compute(exam: &Exam, ledger: &AnswerLedger) -> Self {
        let per_question: Vec<QuestionOutcome> = exam
            .questions()
            .iter()
            .map(|question| {
                let selected = ledger.get(question.id());
                QuestionOutcome {
                    question_id: question.id(),
                    is_answered: selected.is_some(),
                    is_correct: selected == Some(question.correct_option()),
                    selected_option: selected,
                }
            })
            .collect();

        let correct_count = per_question.iter().filter(|o| o.is_correct).count();
        let total_count = per_question.len();

        Self {
            correct_count,
            total_count,
            percentage: percentage_round_half_up(correct_count, total_count),
            per_question,
        }
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn incorrect_count(&self) -> usize {
        self.total_count - self.correct_count
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Score as a whole percentage in `0..=100`.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.percentage
    }

    #[must_use]
    pub fn per_question(&self) -> &[QuestionOutcome] {
        &self.per_question
    }

    /// Outcomes matching the given review filter, in exam order.
    #[must_use]
    pub fn filtered(&self, filter: ReportFilter) -> Vec<&QuestionOutcome> {
        self.per_question
            .iter()
            .filter(|outcome| match filter {
                ReportFilter::All => true,
                ReportFilter::Correct => outcome.is_correct,
                ReportFilter::Incorrect => outcome.is_answered && !outcome.is_correct,
            })
            .collect()
    }
}

/// `round(100 * correct / total)` with ties rounding up, in exact integer
/// arithmetic so 12.5% becomes 13%.
fn percentage_round_half_up(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = correct as u64;
    let total = total as u64;
    ((200 * correct + total) / (2 * total)) as u32
}
