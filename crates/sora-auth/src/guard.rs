//! Route derivation from session state.
//!
//! Pure functions; the UI calls these with the current snapshot and renders
//! whatever comes back.

use crate::SessionSnapshot;

/// Which top-level route the UI should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Startup resume has not finished yet.
    Loading,
    /// Signed in.
    Home,
    /// Not signed in.
    Login,
}

/// Derive the route from the two state booleans.
pub fn decide(initialized: bool, authenticated: bool) -> RouteDecision {
    if !initialized {
        RouteDecision::Loading
    } else if authenticated {
        RouteDecision::Home
    } else {
        RouteDecision::Login
    }
}

/// Derive the route from a snapshot.
pub fn decide_from_snapshot(snapshot: &SessionSnapshot) -> RouteDecision {
    decide(snapshot.initialized, snapshot.authenticated)
}

/// Whether an error message demands re-authentication.
///
/// Session-related failures carry the locale's session marker; anything else
/// is shown in place without leaving the current route.
pub fn forces_login(error: Option<&str>, marker: &str) -> bool {
    match error {
        Some(message) => message.contains(marker),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sora_i18n::{Locale, Translator};

    #[test]
    fn decide_covers_all_states() {
        assert_eq!(decide(false, false), RouteDecision::Loading);
        assert_eq!(decide(false, true), RouteDecision::Loading);
        assert_eq!(decide(true, true), RouteDecision::Home);
        assert_eq!(decide(true, false), RouteDecision::Login);
    }

    #[test]
    fn decide_from_snapshot_matches_booleans() {
        let mut snapshot = SessionSnapshot::default();
        assert_eq!(decide_from_snapshot(&snapshot), RouteDecision::Loading);

        snapshot.initialized = true;
        assert_eq!(decide_from_snapshot(&snapshot), RouteDecision::Login);

        snapshot.authenticated = true;
        assert_eq!(decide_from_snapshot(&snapshot), RouteDecision::Home);
    }

    #[test]
    fn forces_login_checks_marker_substring() {
        assert!(!forces_login(None, "session"));
        assert!(!forces_login(Some("A network error occurred"), "session"));
        assert!(forces_login(
            Some("Your session has expired. Please sign in again"),
            "session"
        ));
    }

    #[test]
    fn forces_login_matches_localized_refresh_failure() {
        for locale in Locale::all() {
            let t = Translator::load(locale);
            let marker = t.translate("auth.error.sessionMarker");
            let message = t.translate("auth.error.refreshFailed");
            assert!(forces_login(Some(&message), &marker), "{locale:?}");

            let unrelated = t.translate("auth.error.network");
            assert!(!forces_login(Some(&unrelated), &marker), "{locale:?}");
        }
    }
}
