//! # View Router
//!
//! Maps screens to their access requirements and runs the authorization gate
//! on every navigation attempt. Each successful navigation starts a new
//! epoch; results of requests issued under an older [`ViewTicket`] belong to
//! a view the user has left and are dropped by the workflows.

use crate::authorization::{self, AccessRequirement, GateDecision};
use crate::session::SessionSnapshot;
use finder_core::User;
use std::fmt;
use tracing::debug;

/// Sub-panel of the report screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReportPanel {
    /// The report form
    #[default]
    Form,
    /// The user's own reports
    List,
    /// Reporting tips
    Tips,
}

/// Every screen the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Landing page
    Index,
    /// About page
    About,
    /// Contact page
    Contact,
    /// Sign-in form
    Login,
    /// Registration form
    Signup,
    /// Item listing, statistics and claim entry point
    Home,
    /// Report form and the user's own reports
    ReportItem(ReportPanel),
    /// Item search
    Search,
    /// Claims received and made
    Claims,
    /// Profile summary
    Profile,
    /// Administrator dashboard
    Admin,
}

impl Screen {
    /// Access requirement of this screen.
    pub fn requirement(self) -> AccessRequirement {
        match self {
            Self::Index | Self::About | Self::Contact | Self::Login | Self::Signup => {
                AccessRequirement::Public
            }
            Self::Admin => AccessRequirement::Admin,
            _ => AccessRequirement::Authenticated,
        }
    }

    /// Screens only meaningful to anonymous visitors.
    pub fn is_guest_only(self) -> bool {
        matches!(self, Self::Login | Self::Signup)
    }

    /// Screens rendered without navigation chrome.
    pub fn is_public_chrome(self) -> bool {
        self.requirement() == AccessRequirement::Public
    }

    /// Route path.
    pub fn path(self) -> &'static str {
        match self {
            Self::Index => "/",
            Self::About => "/about",
            Self::Contact => "/contact",
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Home => "/home",
            Self::ReportItem(ReportPanel::Form) => "/report-item",
            Self::ReportItem(ReportPanel::List) => "/report-item/list",
            Self::ReportItem(ReportPanel::Tips) => "/report-item/tips",
            Self::Search => "/search",
            Self::Claims => "/claim",
            Self::Profile => "/profile",
            Self::Admin => "/admin",
        }
    }

    /// Parse a route path. Unknown report sub-paths open the form.
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        let screen = match trimmed {
            "" => Self::Index,
            "/about" => Self::About,
            "/contact" => Self::Contact,
            "/login" => Self::Login,
            "/signup" => Self::Signup,
            "/home" => Self::Home,
            "/search" => Self::Search,
            "/claim" => Self::Claims,
            "/profile" => Self::Profile,
            "/admin" => Self::Admin,
            "/report-item/list" => Self::ReportItem(ReportPanel::List),
            "/report-item/tips" => Self::ReportItem(ReportPanel::Tips),
            p if p == "/report-item" || p.starts_with("/report-item/") => {
                Self::ReportItem(ReportPanel::Form)
            }
            _ => return None,
        };
        Some(screen)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Screen a user lands on after signing in.
pub fn landing_screen(user: &User, admin_landing: bool) -> Screen {
    if admin_landing && authorization::is_admin(Some(user)) {
        Screen::Admin
    } else {
        Screen::Home
    }
}

/// Navigation chrome for the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SidebarKind {
    /// Public screens and anonymous visitors
    None,
    /// Signed-in user
    User,
    /// Signed-in administrator
    Admin,
}

/// Identifies the view a request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewTicket {
    screen: Screen,
    epoch: u64,
}

impl ViewTicket {
    /// Screen the ticket was issued on.
    pub fn screen(&self) -> Screen {
        self.screen
    }
}

/// Result of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The requested screen is shown
    Entered(Screen),
    /// The gate sent the user elsewhere
    Redirected {
        /// Screen originally asked for
        requested: Screen,
        /// Screen shown instead
        shown: Screen,
    },
    /// Identity still resolving; the request is parked until [`ViewRouter::resume`]
    Suspended(Screen),
}

impl Navigation {
    /// Screen now on display, if any.
    pub fn shown(&self) -> Option<Screen> {
        match self {
            Self::Entered(screen) => Some(*screen),
            Self::Redirected { shown, .. } => Some(*shown),
            Self::Suspended(_) => None,
        }
    }
}

/// Current screen and navigation epoch.
#[derive(Debug, Clone)]
pub struct ViewRouter {
    current: Screen,
    pending: Option<Screen>,
    epoch: u64,
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::new(Screen::Index)
    }
}

impl ViewRouter {
    /// Router showing `initial` without running the gate.
    pub fn new(initial: Screen) -> Self {
        Self {
            current: initial,
            pending: None,
            epoch: 0,
        }
    }

    /// Screen on display.
    pub fn current(&self) -> Screen {
        self.current
    }

    /// Screen parked while the session resolves.
    pub fn pending(&self) -> Option<Screen> {
        self.pending
    }

    /// Request a screen. The gate is evaluated afresh on every call.
    pub fn navigate(&mut self, session: &SessionSnapshot, target: Screen) -> Navigation {
        // Any navigation abandons the view being left.
        self.epoch += 1;

        if target.is_guest_only() && session.authenticated() == Some(true) {
            return self.redirect(target, Screen::Home);
        }

        match authorization::check(session, target.requirement()) {
            GateDecision::Allow => {
                self.enter(target);
                Navigation::Entered(target)
            }
            GateDecision::RedirectToLogin => self.redirect(target, Screen::Login),
            GateDecision::RedirectToHome => self.redirect(target, Screen::Home),
            GateDecision::Suspend => {
                debug!(%target, "session resolving; navigation parked");
                self.pending = Some(target);
                Navigation::Suspended(target)
            }
        }
    }

    /// Retry a parked navigation once the session has resolved.
    pub fn resume(&mut self, session: &SessionSnapshot) -> Option<Navigation> {
        if session.is_loading() {
            return None;
        }
        let target = self.pending.take()?;
        Some(self.navigate(session, target))
    }

    /// Re-run the gate for the screen on display, e.g. after logout.
    pub fn revalidate(&mut self, session: &SessionSnapshot) -> Navigation {
        let screen = self.pending.unwrap_or(self.current);
        self.navigate(session, screen)
    }

    /// Ticket for requests issued by the current view.
    pub fn ticket(&self) -> ViewTicket {
        ViewTicket {
            screen: self.current,
            epoch: self.epoch,
        }
    }

    /// Whether results for `ticket` may still be applied.
    pub fn is_current(&self, ticket: &ViewTicket) -> bool {
        ticket.epoch == self.epoch && ticket.screen == self.current
    }

    /// Navigation chrome for the screen on display.
    pub fn sidebar(&self, session: &SessionSnapshot) -> SidebarKind {
        if self.current.is_public_chrome() || session.authenticated() != Some(true) {
            SidebarKind::None
        } else if session.is_admin() {
            SidebarKind::Admin
        } else {
            SidebarKind::User
        }
    }

    fn enter(&mut self, screen: Screen) {
        self.current = screen;
        self.pending = None;
    }

    fn redirect(&mut self, requested: Screen, shown: Screen) -> Navigation {
        debug!(%requested, %shown, "navigation redirected");
        self.enter(shown);
        Navigation::Redirected { requested, shown }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finder_core::UserId;

    fn member() -> SessionSnapshot {
        SessionSnapshot::signed_in(User::new(UserId(1), "a@cit.edu", "USER"))
    }

    fn admin() -> SessionSnapshot {
        SessionSnapshot::signed_in(User::new(UserId(2), "root@cit.edu", "ADMIN"))
    }

    #[test]
    fn test_paths_round_trip_for_every_screen() {
        let screens = [
            Screen::Index,
            Screen::About,
            Screen::Contact,
            Screen::Login,
            Screen::Signup,
            Screen::Home,
            Screen::ReportItem(ReportPanel::Form),
            Screen::ReportItem(ReportPanel::List),
            Screen::ReportItem(ReportPanel::Tips),
            Screen::Search,
            Screen::Claims,
            Screen::Profile,
            Screen::Admin,
        ];
        for screen in screens {
            assert_eq!(Screen::from_path(screen.path()), Some(screen));
        }
        assert_eq!(
            Screen::from_path("/report-item/other"),
            Some(Screen::ReportItem(ReportPanel::Form))
        );
        assert_eq!(Screen::from_path("/nowhere"), None);
    }

    #[test]
    fn test_anonymous_goes_to_login() {
        let mut router = ViewRouter::default();
        let nav = router.navigate(&SessionSnapshot::anonymous(), Screen::Claims);
        assert_eq!(nav.shown(), Some(Screen::Login));
        assert_eq!(router.current(), Screen::Login);
    }

    #[test]
    fn test_member_cannot_enter_admin() {
        let mut router = ViewRouter::default();
        let nav = router.navigate(&member(), Screen::Admin);
        assert_eq!(
            nav,
            Navigation::Redirected {
                requested: Screen::Admin,
                shown: Screen::Home
            }
        );
        assert_eq!(
            router.navigate(&admin(), Screen::Admin),
            Navigation::Entered(Screen::Admin)
        );
    }

    #[test]
    fn test_gate_is_reevaluated_after_logout() {
        let mut router = ViewRouter::default();
        router.navigate(&member(), Screen::Profile);
        assert_eq!(router.current(), Screen::Profile);
        let nav = router.revalidate(&SessionSnapshot::anonymous());
        assert_eq!(nav.shown(), Some(Screen::Login));
    }

    #[test]
    fn test_suspends_then_resumes() {
        let mut router = ViewRouter::default();
        let resolving = SessionSnapshot::resolving(None, true);
        assert_eq!(
            router.navigate(&resolving, Screen::Home),
            Navigation::Suspended(Screen::Home)
        );
        assert_eq!(router.current(), Screen::Index);
        assert!(router.resume(&resolving).is_none());

        let nav = router.resume(&member()).unwrap();
        assert_eq!(nav, Navigation::Entered(Screen::Home));
        assert!(router.pending().is_none());
    }

    #[test]
    fn test_guest_only_screens_redirect_home() {
        let mut router = ViewRouter::default();
        assert_eq!(
            router.navigate(&member(), Screen::Login).shown(),
            Some(Screen::Home)
        );
        assert_eq!(
            router.navigate(&SessionSnapshot::anonymous(), Screen::Signup),
            Navigation::Entered(Screen::Signup)
        );
    }

    #[test]
    fn test_tickets_expire_on_navigation() {
        let mut router = ViewRouter::default();
        router.navigate(&member(), Screen::Claims);
        let ticket = router.ticket();
        assert!(router.is_current(&ticket));
        router.navigate(&member(), Screen::Home);
        assert!(!router.is_current(&ticket));
        router.navigate(&member(), Screen::Claims);
        assert!(!router.is_current(&ticket));
    }

    #[test]
    fn test_sidebar_selection() {
        let mut router = ViewRouter::default();
        assert_eq!(router.sidebar(&member()), SidebarKind::None);
        router.navigate(&member(), Screen::Home);
        assert_eq!(router.sidebar(&member()), SidebarKind::User);
        assert_eq!(router.sidebar(&admin()), SidebarKind::Admin);
        assert_eq!(
            router.sidebar(&SessionSnapshot::anonymous()),
            SidebarKind::None
        );
    }

    #[test]
    fn test_landing_screen_by_role() {
        let boss = User::new(UserId(3), "boss@cit.edu", "admin");
        assert_eq!(landing_screen(&boss, true), Screen::Admin);
        assert_eq!(landing_screen(&boss, false), Screen::Home);
        let user = User::new(UserId(4), "admin@wildcatsf.com", "USER");
        assert_eq!(landing_screen(&user, true), Screen::Home);
    }
}
