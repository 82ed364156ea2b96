//! Session guard and router against the HTTP backend.

#![allow(clippy::unwrap_used)]

use pawshop_client::error::ClientError;
use pawshop_client::guard::GuardState;
use pawshop_client::router::Navigation;
use pawshop_core::{Credential, Email, NavigationState, Route, SessionState};
use pawshop_integration_tests::{ADMIN_PASSWORD, ADMIN_TOKEN, ADMIN_USERNAME, MockShop};
use secrecy::SecretString;

fn admin() -> Email {
    Email::parse(ADMIN_USERNAME).unwrap()
}

#[tokio::test]
async fn test_admin_without_cookie_lands_on_login() {
    let server = MockShop::new().start().await;
    let app = server.app();
    let mut router = app.router();

    let navigation = router
        .navigate("/admin/product", NavigationState::default())
        .await;

    assert_eq!(navigation, Navigation::Rendered(Route::Login));
    assert_eq!(router.history().len(), 1);
    // No credential, no round trip
    assert_eq!(server.shop.calls("validate_session"), 0);
}

#[tokio::test]
async fn test_login_page_with_valid_token_lands_on_admin() {
    let server = MockShop::new().start().await;
    let app = server.app();
    app.credentials()
        .set(Credential::new(
            ADMIN_TOKEN,
            chrono::Utc::now() + chrono::Duration::hours(1),
        ))
        .unwrap();
    let mut router = app.router();

    let navigation = router.navigate("/login", NavigationState::default()).await;

    assert_eq!(navigation, Navigation::Rendered(Route::AdminProducts));
    // Once for the login page, once more when the admin page activates
    assert_eq!(server.shop.calls("validate_session"), 2);
    assert_eq!(router.current(), Some(&Route::AdminProducts));
    assert_eq!(app.guard().state(), GuardState::Allowed);
}

#[tokio::test]
async fn test_rejected_token_redirects_to_login() {
    let server = MockShop::new().start().await;
    let app = server.app();
    app.credentials()
        .set(Credential::new(
            "stale-token",
            chrono::Utc::now() + chrono::Duration::hours(1),
        ))
        .unwrap();
    let mut router = app.router();

    let navigation = router
        .navigate("/admin/product", NavigationState::default())
        .await;

    assert_eq!(navigation, Navigation::Rendered(Route::Login));
    // Rejected by the admin guard, then checked again by the login page
    assert_eq!(server.shop.calls("validate_session"), 2);
}

#[tokio::test]
async fn test_back_to_post_login_admin_entry_validates() {
    let server = MockShop::new().start().await;
    let app = server.app();
    let redirect = app
        .auth()
        .login(&admin(), &SecretString::from(ADMIN_PASSWORD))
        .await
        .unwrap();
    let mut router = app.router();
    router.follow(redirect).await;
    router.navigate("/products", NavigationState::default()).await;
    assert_eq!(server.shop.calls("validate_session"), 0);

    let navigation = router.back().await;

    assert_eq!(navigation, Some(Navigation::Rendered(Route::AdminProducts)));
    assert_eq!(server.shop.calls("validate_session"), 1);
    assert_eq!(
        router.history().current().unwrap().state,
        NavigationState::default()
    );
}

#[tokio::test]
async fn test_validation_outage_counts_as_signed_out() {
    let server = MockShop::new().start().await;
    server.shop.fail("validate_session");
    let app = server.app();
    app.credentials()
        .set(Credential::new(
            ADMIN_TOKEN,
            chrono::Utc::now() + chrono::Duration::hours(1),
        ))
        .unwrap();

    let decision = app
        .guard()
        .check(
            pawshop_core::RouteCategory::Admin,
            NavigationState::default(),
        )
        .await
        .unwrap();

    assert_eq!(decision.session, SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_login_then_admin_skips_second_check() {
    let server = MockShop::new().start().await;
    let app = server.app();

    let redirect = app
        .auth()
        .login(&admin(), &SecretString::from(ADMIN_PASSWORD))
        .await
        .unwrap();
    let mut router = app.router();
    let navigation = router.follow(redirect).await;

    assert_eq!(navigation, Navigation::Rendered(Route::AdminProducts));
    // The login handoff vouches for the fresh token
    assert_eq!(server.shop.calls("validate_session"), 0);
    assert!(app.credentials().get().is_some());

    // Reloading the admin page validates again
    let navigation = router
        .navigate("/admin/product", NavigationState::default())
        .await;
    assert_eq!(navigation, Navigation::Rendered(Route::AdminProducts));
    assert_eq!(server.shop.calls("validate_session"), 1);
}

#[tokio::test]
async fn test_wrong_password_keeps_store_empty() {
    let server = MockShop::new().start().await;
    let app = server.app();
    let mut notices = app.notices().subscribe();

    let err = app
        .auth()
        .login(&admin(), &SecretString::from("wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Request(_)));
    assert!(app.credentials().get().is_none());
    let messages: Vec<String> = pawshop_client::notice::drain(&mut notices)
        .into_iter()
        .map(|n| n.message)
        .collect();
    assert_eq!(messages, ["Login failed"]);
}

#[tokio::test]
async fn test_logout_returns_to_login() {
    let server = MockShop::new().start().await;
    let app = server.app();
    app.auth()
        .login(&admin(), &SecretString::from(ADMIN_PASSWORD))
        .await
        .unwrap();

    let redirect = app.auth().logout().unwrap();
    let navigation = app.router().follow(redirect).await;

    assert_eq!(navigation, Navigation::Rendered(Route::Login));
    assert!(app.credentials().get().is_none());
}
