//! Screen gating for anonymous, ordinary and administrator sessions.

use finder_app::authorization::{evaluate, is_admin_role};
use finder_app::{GateDecision, Screen, SidebarKind};
use finder_core::{User, UserId};
use finder_testkit::{fixtures, TestHarness};
use proptest::prelude::*;

const PROTECTED: [Screen; 5] = [
    Screen::Home,
    Screen::Search,
    Screen::Claims,
    Screen::Profile,
    Screen::Admin,
];

#[tokio::test]
async fn anonymous_visitors_are_sent_to_login() {
    let harness = TestHarness::new();
    harness.start().await.unwrap();
    for screen in PROTECTED {
        assert_eq!(harness.navigate(screen).await, Some(Screen::Login), "{screen}");
    }
    for screen in [Screen::Index, Screen::About, Screen::Contact, Screen::Signup] {
        assert_eq!(harness.navigate(screen).await, Some(screen));
    }
    assert_eq!(harness.app_core.read().await.sidebar(), SidebarKind::None);
}

#[tokio::test]
async fn ordinary_users_are_kept_out_of_admin() {
    let harness = TestHarness::new();
    harness.sign_in(&fixtures::bob()).await.unwrap();
    assert_eq!(harness.navigate(Screen::Admin).await, Some(Screen::Home));
    assert_eq!(harness.navigate(Screen::Claims).await, Some(Screen::Claims));
    assert_eq!(harness.app_core.read().await.sidebar(), SidebarKind::User);
}

#[tokio::test]
async fn logout_closes_protected_screens_again() {
    let harness = TestHarness::new();
    harness.sign_in(&fixtures::admin()).await.unwrap();
    assert_eq!(harness.navigate(Screen::Admin).await, Some(Screen::Admin));

    finder_app::workflows::logout(&harness.app_core).await.unwrap();
    assert_eq!(harness.navigate(Screen::Admin).await, Some(Screen::Login));
}

fn role_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "admin", "ADMIN", "Admin", " admin ", "USER", "user", "staff", "", "administrator",
    ])
    .prop_map(str::to_string)
}

proptest! {
    #[test]
    fn gate_matches_role_and_requirements(
        role in role_strategy(),
        signed_in in any::<bool>(),
        requires_auth in any::<bool>(),
        requires_admin in any::<bool>(),
    ) {
        let user = User::new(UserId(7), "someone@cit.edu", role.clone());
        let identity = signed_in.then_some(&user);
        let decision = evaluate(identity, requires_auth, requires_admin);

        let expected = if identity.is_none() && (requires_auth || requires_admin) {
            GateDecision::RedirectToLogin
        } else if requires_admin && !is_admin_role(Some(&role)) {
            GateDecision::RedirectToHome
        } else {
            GateDecision::Allow
        };
        prop_assert_eq!(decision, expected);
        prop_assert_eq!(is_admin_role(Some(&role)), role.trim().eq_ignore_ascii_case("admin"));
    }
}
