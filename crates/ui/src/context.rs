use std::sync::Arc;

use exam_core::model::ExamId;
use services::SessionLoopService;

/// UI-facing surface of the composition root. The binary crate implements
/// this; views only ever see the `AppContext` built from it.
pub trait UiApp: Send + Sync {
    fn default_exam_id(&self) -> ExamId;
    fn session_loop(&self) -> Arc<SessionLoopService>;
}

#[derive(Clone)]
pub struct AppContext {
    default_exam_id: ExamId,
    session_loop: Arc<SessionLoopService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            default_exam_id: app.default_exam_id(),
            session_loop: app.session_loop(),
        }
    }

    #[must_use]
    pub fn default_exam_id(&self) -> ExamId {
        self.default_exam_id
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }
}

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
