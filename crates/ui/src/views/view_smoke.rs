use std::sync::Arc;

use storage::repository::{ANSWERS_KEY, InMemoryRepository, ProgressRepository, TIME_KEY};

use super::test_harness::{ViewKind, drive_dom, setup_view_harness, setup_view_harness_with_repo};
use crate::vm::SessionIntent;

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_catalog() {
    let mut harness = setup_view_harness(ViewKind::Home).await;
    harness.rebuild();
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("Web Basics Quiz"), "missing quiz in {html}");
    assert!(html.contains("Data Structures Final"), "missing final in {html}");
    assert!(html.contains("45 questions"), "missing count in {html}");
    assert!(html.contains("105 min"), "missing duration in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn session_view_smoke_renders_first_question() {
    let mut harness = setup_view_harness(ViewKind::Session(1)).await;
    harness.rebuild();
    harness.drive_async().await;
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("What is Next.js?"), "missing prompt in {html}");
    assert!(html.contains("10:00"), "missing timer in {html}");
    assert!(html.contains("Question 1 of 3"), "missing position in {html}");
    assert!(html.contains("0/3 answered"), "missing progress in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn session_view_smoke_select_and_submit_shows_results() {
    let mut harness = setup_view_harness(ViewKind::Session(1)).await;
    harness.rebuild();
    harness.drive_async().await;
    harness.drive_async().await;

    let handles = harness.session_handles.clone().expect("session handles");
    let dispatch = handles.dispatch();

    dispatch.call(SessionIntent::Select(0));
    drive_dom(&mut harness.dom);
    harness.drive_async().await;

    dispatch.call(SessionIntent::Submit);
    drive_dom(&mut harness.dom);
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("Results"), "missing results in {html}");
    assert!(html.contains("33%"), "missing score in {html}");
    assert!(html.contains("Correct (1)"), "missing correct tab in {html}");
    assert!(html.contains("Incorrect (2)"), "missing incorrect tab in {html}");

    // Submission clears the saved pair.
    assert!(harness.repo.load().await.unwrap().is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn session_view_smoke_resumes_saved_progress() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.put_raw(ANSWERS_KEY, r#"{"1":1}"#).unwrap();
    repo.put_raw(TIME_KEY, "120").unwrap();

    let mut harness = setup_view_harness_with_repo(ViewKind::Session(1), repo).await;
    harness.rebuild();
    harness.drive_async().await;
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("2:00"), "missing resumed timer in {html}");
    assert!(html.contains("1/3 answered"), "missing resumed progress in {html}");
}
