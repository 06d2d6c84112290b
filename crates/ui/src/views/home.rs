use dioxus::prelude::*;
use dioxus_router::Link;

use services::catalog;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};

#[derive(Clone, Debug, PartialEq)]
struct ExamCard {
    exam_id: u64,
    title: String,
    subject: Option<String>,
    question_count: usize,
    minutes: u32,
}

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let default_exam_id = ctx.default_exam_id().value();

    let resource = use_resource(move || async move {
        let exams = catalog::all_exams().map_err(|_| ViewError::Unknown)?;
        Ok::<_, ViewError>(
            exams
                .iter()
                .map(|exam| ExamCard {
                    exam_id: exam.id().value(),
                    title: exam.title().to_string(),
                    subject: exam.subject().map(ToString::to_string),
                    question_count: exam.total_count(),
                    minutes: exam.duration_secs() / 60,
                })
                .collect::<Vec<_>>(),
        )
    });
    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page home-page",
            h2 { "My Exams" }
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
                ViewState::Ready(cards) => rsx! {
                    ul { class: "exam-list",
                        for card in cards {
                            li {
                                class: if card.exam_id == default_exam_id {
                                    "exam-card exam-card--default"
                                } else {
                                    "exam-card"
                                },
                                h3 { class: "exam-card__title", "{card.title}" }
                                if let Some(subject) = card.subject.as_deref() {
                                    p { class: "exam-card__subject", "{subject}" }
                                }
                                p { class: "exam-card__meta",
                                    "{card.question_count} questions · {card.minutes} min"
                                }
                                Link {
                                    class: "btn btn-primary",
                                    to: Route::Session { exam_id: card.exam_id },
                                    "Start Exam"
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}
