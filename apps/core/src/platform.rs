/// Global hotkeys need an X11 session; Wayland compositors do not expose a
/// key-grab surface this layer can use, so the feature is skipped there.
pub fn supports_global_hotkeys() -> bool {
    is_x11_session(
        std::env::var("XDG_SESSION_TYPE").ok().as_deref(),
        std::env::var("WAYLAND_DISPLAY").ok().as_deref(),
        std::env::var("DISPLAY").ok().as_deref(),
    )
}

fn is_x11_session(
    session_type: Option<&str>,
    wayland_display: Option<&str>,
    display: Option<&str>,
) -> bool {
    match session_type {
        Some(value) if value.eq_ignore_ascii_case("x11") => return true,
        Some(value) if value.eq_ignore_ascii_case("wayland") => return false,
        _ => {}
    }

    if wayland_display.map(|v| !v.is_empty()).unwrap_or(false) {
        return false;
    }

    display.map(|v| !v.is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::is_x11_session;

    #[test]
    fn session_type_wins_over_display_variables() {
        assert!(is_x11_session(Some("x11"), Some("wayland-0"), None));
        assert!(!is_x11_session(Some("wayland"), None, Some(":0")));
    }

    #[test]
    fn falls_back_to_display_probing() {
        assert!(is_x11_session(None, None, Some(":0")));
        assert!(!is_x11_session(None, Some("wayland-0"), Some(":0")));
        assert!(!is_x11_session(None, None, None));
        assert!(!is_x11_session(None, None, Some("")));
    }
}
