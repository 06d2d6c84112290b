use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use exam_core::model::ExamId;
use exam_core::time::fixed_clock;
use services::SessionLoopService;
use storage::repository::InMemoryRepository;

use super::session::SessionTestHandles;
use crate::context::{UiApp, build_app_context};
use crate::views::{HomeView, SessionView};

#[derive(Clone)]
struct TestApp {
    exam_id: ExamId,
    session_loop: Arc<SessionLoopService>,
}

impl UiApp for TestApp {
    fn default_exam_id(&self) -> ExamId {
        self.exam_id
    }

    fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Session(u64),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    session_handles: Option<SessionTestHandles>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    if let Some(handles) = props.session_handles.clone() {
        use_context_provider(|| handles);
    }
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Session(exam_id) => rsx! { SessionView { exam_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub repo: Arc<InMemoryRepository>,
    pub session_handles: Option<SessionTestHandles>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub async fn setup_view_harness(view: ViewKind) -> ViewHarness {
    setup_view_harness_with_repo(view, Arc::new(InMemoryRepository::new())).await
}

pub async fn setup_view_harness_with_repo(
    view: ViewKind,
    repo: Arc<InMemoryRepository>,
) -> ViewHarness {
    let session_loop = Arc::new(SessionLoopService::new(fixed_clock(), repo.clone()));

    let session_handles = match view {
        ViewKind::Session(_) => Some(SessionTestHandles::default()),
        ViewKind::Home => None,
    };

    let app = Arc::new(TestApp {
        exam_id: ExamId::new(1),
        session_loop,
    });

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            session_handles: session_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        repo,
        session_handles,
    }
}
