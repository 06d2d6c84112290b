use dioxus::document::eval;
use dioxus::prelude::*;

use exam_core::model::{ExamId, ReportFilter};

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ReviewRow, SessionIntent, SessionVm, start_session};

use super::scripts::visibility_watch_script;

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

/// Owned snapshot of everything the in-progress screen renders, pulled out
/// of the view-model in one read.
#[derive(Clone, Debug, PartialEq)]
struct ProgressData {
    title: String,
    timer_label: String,
    low_time: bool,
    hidden_count: u32,
    current_index: usize,
    total: usize,
    answered: usize,
    completion_percent: u32,
    prompt: String,
    options: Vec<String>,
    selection: Option<usize>,
    answered_flags: Vec<bool>,
}

#[derive(Clone, Debug, PartialEq)]
struct ResultsData {
    title: String,
    percentage: u32,
    correct: usize,
    incorrect: usize,
    total: usize,
    rows: Vec<ReviewRow>,
}

fn progress_data(session: &SessionVm) -> ProgressData {
    ProgressData {
        title: session.title().to_string(),
        timer_label: session.timer_label(),
        low_time: session.is_low_time(),
        hidden_count: session.hidden_count(),
        current_index: session.current_index(),
        total: session.total_count(),
        answered: session.answered_count(),
        completion_percent: session.completion_percent(),
        prompt: session.current_prompt().to_string(),
        options: session.current_options().to_vec(),
        selection: session.current_selection(),
        answered_flags: (0..session.total_count())
            .map(|index| session.is_answered_at(index))
            .collect(),
    }
}

fn results_data(session: &SessionVm, filter: ReportFilter) -> ResultsData {
    ResultsData {
        title: session.title().to_string(),
        percentage: session.score_percentage(),
        correct: session.score_correct(),
        incorrect: session.score_incorrect(),
        total: session.total_count(),
        rows: session.review_rows(filter),
    }
}

#[component]
pub fn SessionView(exam_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let session_loop = ctx.session_loop();
    let exam_id = ExamId::new(exam_id);

    let error = use_signal(|| None::<ViewError>);
    let vm = use_signal(|| None::<SessionVm>);
    let confirm_open = use_signal(|| false);
    let filter = use_signal(ReportFilter::default);

    let session_loop_for_resource = session_loop.clone();
    let resource = use_resource(move || {
        let session_loop = session_loop_for_resource.clone();
        let mut error = error;
        let mut vm = vm;

        async move {
            let started = start_session(&session_loop, exam_id).await?;
            vm.set(Some(started));
            error.set(None);
            Ok::<_, ViewError>(())
        }
    });
    let state = view_state_from_resource(&resource);

    // One-second clock driver. The session ignores ticks once submitted, so
    // the loop can keep running for the life of the view.
    let session_loop_for_timer = session_loop.clone();
    use_future(move || {
        let session_loop = session_loop_for_timer.clone();
        let mut vm = vm;

        async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                let taken = vm.write().take();
                let Some(mut current) = taken else { continue };
                let _ = current.tick(&session_loop).await;
                vm.set(Some(current));
            }
        }
    });

    // Focus-loss watcher: counts the events for the warning banner but never
    // blocks the attempt.
    use_future(move || {
        let mut vm = vm;

        async move {
            let mut watcher = eval(visibility_watch_script());
            while watcher.recv::<u32>().await.is_ok() {
                if let Some(session) = vm.write().as_mut() {
                    session.note_hidden();
                }
            }
        }
    });

    let dispatch_intent = {
        let session_loop = session_loop.clone();
        use_callback(move |intent: SessionIntent| {
            let session_loop = session_loop.clone();
            let mut error = error;
            let mut vm = vm;
            let mut confirm_open = confirm_open;
            let mut filter = filter;

            match intent {
                SessionIntent::Next => {
                    if let Some(session) = vm.write().as_mut() {
                        session.next();
                    }
                }
                SessionIntent::Previous => {
                    if let Some(session) = vm.write().as_mut() {
                        session.previous();
                    }
                }
                SessionIntent::JumpTo(index) => {
                    if let Some(session) = vm.write().as_mut() {
                        session.jump_to(index);
                    }
                }
                SessionIntent::Select(index) => {
                    spawn(async move {
                        // Take the session out so no borrow is held across
                        // the await; always put it back.
                        let taken = vm.write().take();
                        let Some(mut current) = taken else { return };
                        let result = current.select_current(&session_loop, index).await;
                        vm.set(Some(current));
                        error.set(result.err());
                    });
                }
                SessionIntent::Submit => {
                    spawn(async move {
                        confirm_open.set(false);
                        let taken = vm.write().take();
                        let Some(mut current) = taken else { return };
                        let result = current.submit(&session_loop).await;
                        vm.set(Some(current));
                        error.set(result.err());
                    });
                }
                SessionIntent::Restart => {
                    spawn(async move {
                        filter.set(ReportFilter::All);
                        let taken = vm.write().take();
                        let Some(mut current) = taken else { return };
                        let result = current.restart(&session_loop).await;
                        vm.set(Some(current));
                        error.set(result.err());
                    });
                }
            }
        })
    };

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<SessionTestHandles>() {
                handles.register(dispatch_intent, vm);
            }
        }
    }

    let active_filter = filter();
    let confirm = confirm_open();
    let (progress, results) = {
        let vm_guard = vm.read();
        match vm_guard.as_ref() {
            Some(session) if session.is_submitted() => {
                (None, Some(results_data(session, active_filter)))
            }
            Some(session) => (Some(progress_data(session)), None),
            None => (None, None),
        }
    };
    let mut confirm_open = confirm_open;
    let mut filter = filter;

    rsx! {
        div { class: "page session-page", id: "session-root",
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
                ViewState::Ready(()) => rsx! {
                    if let Some(err) = *error.read() {
                        p { class: "inline-error", "{err.message()}" }
                    }
                    match (results, progress) {
                        (Some(data), _) => rsx! {
                            ResultsPanel {
                                data,
                                active_filter,
                                on_filter: move |next| filter.set(next),
                                on_intent: dispatch_intent,
                            }
                        },
                        (None, Some(data)) => rsx! {
                            ProgressPanel {
                                data,
                                confirm,
                                on_confirm: move |open| confirm_open.set(open),
                                on_intent: dispatch_intent,
                            }
                        },
                        (None, None) => rsx! {
                            p { "Loading..." }
                        },
                    }
                },
            }
        }
    }
}

#[component]
fn ProgressPanel(
    data: ProgressData,
    confirm: bool,
    on_confirm: EventHandler<bool>,
    on_intent: EventHandler<SessionIntent>,
) -> Element {
    let question_number = data.current_index + 1;
    let timer_class = if data.low_time {
        "session-timer session-timer--low"
    } else {
        "session-timer"
    };
    let at_first = data.current_index == 0;
    let at_last = question_number == data.total;

    rsx! {
        header { class: "session-header",
            h2 { "{data.title}" }
            span { class: "{timer_class}", id: "session-timer", "{data.timer_label}" }
        }
        if data.hidden_count > 0 {
            div { class: "warning-banner", role: "alert",
                "You left the exam window {data.hidden_count} time(s). Stay on this screen."
            }
        }
        div { class: "session-progress",
            span { "Question {question_number} of {data.total}" }
            span { "{data.answered}/{data.total} answered" }
            div { class: "progress-bar",
                div {
                    class: "progress-bar__fill",
                    style: "width: {data.completion_percent}%",
                }
            }
        }
        nav { class: "question-nav",
            for (index, label) in (0..data.total).map(|index| (index, index + 1)) {
                button {
                    class: question_nav_class(
                        index == data.current_index,
                        data.answered_flags.get(index).copied().unwrap_or(false),
                    ),
                    onclick: move |_| on_intent.call(SessionIntent::JumpTo(index)),
                    "{label}"
                }
            }
        }
        section { class: "session-question",
            h3 { "{data.prompt}" }
            ul { class: "session-options",
                for (index, option) in data.options.iter().enumerate() {
                    li {
                        button {
                            class: if data.selection == Some(index) {
                                "option-btn option-btn--selected"
                            } else {
                                "option-btn"
                            },
                            onclick: move |_| on_intent.call(SessionIntent::Select(index)),
                            "{option}"
                        }
                    }
                }
            }
        }
        footer { class: "session-footer",
            button {
                class: "btn btn-secondary",
                disabled: at_first,
                onclick: move |_| on_intent.call(SessionIntent::Previous),
                "Previous"
            }
            button {
                class: "btn btn-secondary",
                disabled: at_last,
                onclick: move |_| on_intent.call(SessionIntent::Next),
                "Next"
            }
            button {
                class: "btn btn-primary",
                onclick: move |_| on_confirm.call(true),
                "Submit Exam"
            }
        }
        if confirm {
            div { class: "confirm-overlay",
                div {
                    class: "confirm-dialog",
                    role: "dialog",
                    aria_modal: "true",
                    h3 { "Submit exam?" }
                    p {
                        "{data.answered} of {data.total} questions answered. "
                        "You cannot change answers after submitting."
                    }
                    div { class: "confirm-dialog__actions",
                        button {
                            class: "btn btn-secondary",
                            onclick: move |_| on_confirm.call(false),
                            "Cancel"
                        }
                        button {
                            class: "btn btn-primary",
                            onclick: move |_| on_intent.call(SessionIntent::Submit),
                            "Submit"
                        }
                    }
                }
            }
        }
    }
}

fn question_nav_class(current: bool, answered: bool) -> &'static str {
    match (current, answered) {
        (true, _) => "nav-dot nav-dot--current",
        (false, true) => "nav-dot nav-dot--answered",
        (false, false) => "nav-dot",
    }
}

#[component]
fn ResultsPanel(
    data: ResultsData,
    active_filter: ReportFilter,
    on_filter: EventHandler<ReportFilter>,
    on_intent: EventHandler<SessionIntent>,
) -> Element {
    rsx! {
        header { class: "session-header",
            h2 { "Exam Results" }
            span { class: "session-subtitle", "{data.title}" }
        }
        div { class: "results-score",
            p { class: "results-score__percent", "{data.percentage}%" }
            p { "{data.correct} of {data.total} correct" }
        }
        div { class: "filter-tabs",
            FilterTab {
                label: format!("All ({})", data.total),
                filter: ReportFilter::All,
                active_filter,
                on_filter,
            }
            FilterTab {
                label: format!("Correct ({})", data.correct),
                filter: ReportFilter::Correct,
                active_filter,
                on_filter,
            }
            FilterTab {
                label: format!("Incorrect ({})", data.incorrect),
                filter: ReportFilter::Incorrect,
                active_filter,
                on_filter,
            }
        }
        ul { class: "review-list",
            for row in data.rows {
                li {
                    class: if row.is_correct {
                        "review-row review-row--correct"
                    } else {
                        "review-row review-row--incorrect"
                    },
                    p { class: "review-row__prompt", "{row.number}. {row.prompt}" }
                    p { class: "review-row__selected",
                        match row.selected.as_deref() {
                            Some(selected) => rsx! { "Your answer: {selected}" },
                            None => rsx! { "Not answered" },
                        }
                    }
                    if !row.is_correct {
                        p { class: "review-row__correct", "Correct answer: {row.correct}" }
                    }
                }
            }
        }
        footer { class: "session-footer",
            button {
                class: "btn btn-primary",
                onclick: move |_| on_intent.call(SessionIntent::Restart),
                "Restart Exam"
            }
        }
    }
}

#[component]
fn FilterTab(
    label: String,
    filter: ReportFilter,
    active_filter: ReportFilter,
    on_filter: EventHandler<ReportFilter>,
) -> Element {
    let class = if filter == active_filter {
        "filter-tab filter-tab--active"
    } else {
        "filter-tab"
    };
    rsx! {
        button {
            class: "{class}",
            onclick: move |_| on_filter.call(filter),
            "{label}"
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct SessionTestHandles {
    dispatch: Rc<RefCell<Option<Callback<SessionIntent>>>>,
    vm: Rc<RefCell<Option<Signal<Option<SessionVm>>>>>,
}

#[cfg(test)]
impl SessionTestHandles {
    pub(crate) fn register(
        &self,
        dispatch: Callback<SessionIntent>,
        vm: Signal<Option<SessionVm>>,
    ) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.vm.borrow_mut() = Some(vm);
    }

    pub(crate) fn dispatch(&self) -> Callback<SessionIntent> {
        (*self.dispatch.borrow()).expect("session dispatch registered")
    }

    pub(crate) fn vm(&self) -> Signal<Option<SessionVm>> {
        (*self.vm.borrow()).expect("session vm registered")
    }
}
