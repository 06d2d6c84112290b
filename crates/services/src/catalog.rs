//! Built-in exam catalog.
//!
//! Exams are fixed in-memory data; there is no exam persistence or authoring
//! backend. The catalog is the seam where one would plug a real source later.

use exam_core::model::{Exam, ExamId, Question, QuestionId};

use crate::error::CatalogError;

/// Short three-question quiz with a ten minute limit.
///
/// # Errors
///
/// Returns `CatalogError` if the built-in data fails validation.
pub fn web_basics_quiz() -> Result<Exam, CatalogError> {
    let questions = vec![
        Question::new(
            QuestionId::new(1),
            "What is Next.js?",
            vec![
                "A framework".into(),
                "A library".into(),
                "An API".into(),
                "None of these".into(),
            ],
            0,
        )?,
        Question::new(
            QuestionId::new(2),
            "What is React?",
            vec![
                "A library".into(),
                "A framework".into(),
                "A language".into(),
                "None of these".into(),
            ],
            0,
        )?,
        Question::new(
            QuestionId::new(3),
            "What is TypeScript?",
            vec![
                "A superset of JavaScript".into(),
                "A runtime".into(),
                "A compiler".into(),
                "None of these".into(),
            ],
            0,
        )?,
    ];

    Exam::new(
        ExamId::new(1),
        "Web Basics Quiz",
        Some("Web Development".into()),
        600,
        questions,
    )
    .map_err(CatalogError::from)
}

/// Prompt bank for the generated final; cycled to fill out the paper.
const COMPLEXITY_BANK: &[(&str, usize)] = &[
    ("Searching in a balanced binary search tree takes:", 1),
    ("Pushing onto a stack takes:", 0),
    ("Scanning a singly linked list for a value takes:", 2),
    ("Heapifying an array of n elements takes:", 2),
    ("Sorting n elements with merge sort takes:", 3),
];

const COMPLEXITY_OPTIONS: [&str; 4] = ["O(1)", "O(log n)", "O(n)", "O(n log n)"];

/// Forty-five question mock final with a 1h45m limit.
///
/// # Errors
///
/// Returns `CatalogError` if the built-in data fails validation.
pub fn data_structures_final() -> Result<Exam, CatalogError> {
    let mut questions = Vec::with_capacity(45);
    for n in 1..=45_u32 {
        let (prompt, correct) = COMPLEXITY_BANK[(n as usize - 1) % COMPLEXITY_BANK.len()];
        questions.push(Question::new(
            QuestionId::new(n),
            format!("Q{n}. {prompt}"),
            COMPLEXITY_OPTIONS.iter().map(|s| (*s).to_string()).collect(),
            correct,
        )?);
    }

    Exam::new(
        ExamId::new(2),
        "Data Structures Final",
        Some("Computer Science".into()),
        6_300,
        questions,
    )
    .map_err(CatalogError::from)
}

/// Every exam the app offers, in display order.
///
/// # Errors
///
/// Returns `CatalogError` if any built-in exam fails validation.
pub fn all_exams() -> Result<Vec<Exam>, CatalogError> {
    Ok(vec![web_basics_quiz()?, data_structures_final()?])
}

/// Look up a catalog exam by id.
///
/// # Errors
///
/// Returns `CatalogError::UnknownExam` for an id that is not in the catalog.
pub fn find_exam(id: ExamId) -> Result<Exam, CatalogError> {
    all_exams()?
        .into_iter()
        .find(|exam| exam.id() == id)
        .ok_or(CatalogError::UnknownExam { id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_exams_validate() {
        let exams = all_exams().unwrap();
        assert_eq!(exams.len(), 2);
        assert_eq!(exams[0].total_count(), 3);
        assert_eq!(exams[1].total_count(), 45);
        assert_eq!(exams[1].duration_secs(), 6_300);
    }

    #[test]
    fn find_exam_by_id() {
        let exam = find_exam(ExamId::new(2)).unwrap();
        assert_eq!(exam.title(), "Data Structures Final");

        let err = find_exam(ExamId::new(99)).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownExam { .. }));
    }
}
