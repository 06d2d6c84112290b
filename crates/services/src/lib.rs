#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod session_loop;
pub mod session_service;

pub use exam_core::Clock;

pub use error::{CatalogError, SessionError};
pub use session_loop::SessionLoopService;
pub use session_service::{ExamSession, TickOutcome};
