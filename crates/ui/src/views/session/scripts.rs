/// Registers a one-shot document listener that reports each loss of
/// foreground visibility back to the component.
pub(super) fn visibility_watch_script() -> &'static str {
    r#"(function() {
        if (window.__examVisibilityHooked) { return; }
        window.__examVisibilityHooked = true;
        document.addEventListener("visibilitychange", () => {
            if (document.hidden) {
                dioxus.send(1);
            }
        });
    })();"#
}
