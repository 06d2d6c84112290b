use std::collections::HashMap;
use thiserror::Error;

use crate::model::exam::Exam;
use crate::model::ids::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
    #[error("question {id} is not part of this exam")]
    UnknownQuestion { id: QuestionId },

    #[error("option {index} is out of range for question {id} ({len} options)")]
    OptionOutOfRange {
        id: QuestionId,
        index: usize,
        len: usize,
    },
}

/// The record of which option the user picked per question.
///
/// Entries are only ever written through [`AnswerLedger::select`], which
/// validates against the exam. Selections overwrite, never accumulate;
/// `clear` is the only wholesale removal (restart, not submit).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerLedger {
    entries: HashMap<QuestionId, usize>,
}

impl AnswerLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted entries, dropping anything that no
    /// longer matches the exam. A stale or corrupted entry is not an error;
    /// it is simply forgotten.
    #[must_use]
    pub fn restore(exam: &Exam, entries: impl IntoIterator<Item = (QuestionId, usize)>) -> Self {
        let mut ledger = Self::new();
        for (id, index) in entries {
            let _ = ledger.select(exam, id, index);
        }
        ledger
    }

    /// Record a selection for a question.
    ///
    /// Reselecting (same or different option) overwrites the previous entry
    /// and is never an error; selecting the same option twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::UnknownQuestion` if the id is not in the
    /// exam, or `SelectionError::OptionOutOfRange` for a bad option index.
    /// The ledger is unchanged on error.
    pub fn select(
        &mut self,
        exam: &Exam,
        id: QuestionId,
        option_index: usize,
    ) -> Result<(), SelectionError> {
        let Some(question) = exam.question(id) else {
            return Err(SelectionError::UnknownQuestion { id });
        };
        if !question.is_valid_option(option_index) {
            return Err(SelectionError::OptionOutOfRange {
                id,
                index: option_index,
                len: question.option_count(),
            });
        }

        self.entries.insert(id, option_index);
        Ok(())
    }

    /// The selected option for a question, or `None` when unanswered.
    #[must_use]
    pub fn get(&self, id: QuestionId) -> Option<usize> {
        self.entries.get(&id).copied()
    }

    #[must_use]
    pub fn is_answered(&self, id: QuestionId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of questions with a recorded selection.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(question id, selected option)` pairs.
    ///
    /// Order is unspecified; persistence treats the map as a whole.
    pub fn entries(&self) -> impl Iterator<Item = (QuestionId, usize)> + '_ {
        self.entries.iter().map(|(id, index)| (*id, *index))
    }

    /// Remove every entry. Used on restart, not on normal submit.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
