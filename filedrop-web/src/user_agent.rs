/// Legacy Internet Explorer and EdgeHTML drop a synchronous `click()` on a
/// file input issued from inside another event handler.
pub fn needs_deferred_open(user_agent: &str) -> bool {
    ["Trident/", "MSIE ", "Edge/"]
        .iter()
        .any(|marker| user_agent.contains(marker))
}
