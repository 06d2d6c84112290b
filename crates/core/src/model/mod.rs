mod exam;
mod ids;
mod ledger;
mod question;
mod report;

pub use exam::{Exam, ExamError};
pub use ids::{ExamId, QuestionId};
pub use ledger::{AnswerLedger, SelectionError};
pub use question::{Question, QuestionError};
pub use report::{QuestionOutcome, ReportFilter, ScoreReport};
