use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{ExamId, QuestionId};
use crate::model::question::{Question, QuestionError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamError {
    #[error("exam has no questions")]
    NoQuestions,

    #[error("duplicate question id {id}")]
    DuplicateQuestionId { id: QuestionId },

    #[error("exam duration must be positive")]
    ZeroDuration,

    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// An ordered, immutable set of questions plus exam metadata.
///
/// This is the question store for a session: it exposes read access only and
/// is validated once at construction. A session never adds, removes, or
/// reorders questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exam {
    id: ExamId,
    title: String,
    subject: Option<String>,
    duration_secs: u32,
    questions: Vec<Question>,
}

impl Exam {
    /// Build a validated exam.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::NoQuestions` for an empty question list,
    /// `ExamError::DuplicateQuestionId` when ids collide, and
    /// `ExamError::ZeroDuration` for a zero time limit.
    pub fn new(
        id: ExamId,
        title: impl Into<String>,
        subject: Option<String>,
        duration_secs: u32,
        questions: Vec<Question>,
    ) -> Result<Self, ExamError> {
        if questions.is_empty() {
            return Err(ExamError::NoQuestions);
        }
        if duration_secs == 0 {
            return Err(ExamError::ZeroDuration);
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(ExamError::DuplicateQuestionId { id: question.id() });
            }
        }

        Ok(Self {
            id,
            title: title.into(),
            subject,
            duration_secs,
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> ExamId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Time limit for one attempt, in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    /// Number of questions in this exam.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Question at the given position, or `None` past the end.
    #[must_use]
    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Look up a question by id.
    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    /// Position of the question with the given id.
    #[must_use]
    pub fn index_of(&self, id: QuestionId) -> Option<usize> {
        self.questions.iter().position(|q| q.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u32) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Question {id}"),
            vec!["a".into(), "b".into(), "c".into()],
            0,
        )
        .unwrap()
    }

    fn exam(questions: Vec<Question>) -> Result<Exam, ExamError> {
        Exam::new(ExamId::new(1), "Sample", None, 600, questions)
    }

    #[test]
    fn rejects_empty_question_list() {
        assert_eq!(exam(Vec::new()).unwrap_err(), ExamError::NoQuestions);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = exam(vec![question(1), question(2), question(1)]).unwrap_err();
        assert_eq!(
            err,
            ExamError::DuplicateQuestionId {
                id: QuestionId::new(1)
            }
        );
    }

    #[test]
    fn rejects_zero_duration() {
        let err = Exam::new(ExamId::new(1), "Sample", None, 0, vec![question(1)]).unwrap_err();
        assert_eq!(err, ExamError::ZeroDuration);
    }

    #[test]
    fn looks_up_questions_by_id_and_index() {
        let exam = exam(vec![question(1), question(2), question(3)]).unwrap();

        assert_eq!(exam.total_count(), 3);
        assert_eq!(exam.index_of(QuestionId::new(2)), Some(1));
        assert_eq!(exam.question_at(2).map(Question::id), Some(QuestionId::new(3)));
        assert!(exam.question(QuestionId::new(9)).is_none());
        assert!(exam.question_at(3).is_none());
    }
}
