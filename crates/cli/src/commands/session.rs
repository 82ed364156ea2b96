//! Sign-in, sign-out and plain navigation.

use std::io::BufRead;

use pawshop_client::api::ShopBackend;
use pawshop_client::router::Navigation;
use pawshop_client::state::AppState;
use pawshop_core::{Email, NavigationState};
use secrecy::SecretString;

use super::{CommandError, Result};
use crate::render;

/// Sign in with the password read from the first line of stdin.
pub async fn login<B: ShopBackend>(state: &AppState<B>, username: &str) -> Result<()> {
    let username =
        Email::parse(username).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = SecretString::from(line.trim_end_matches(['\r', '\n']));

    let redirect = state.auth().login(&username, &password).await?;

    let mut router = state.router();
    let navigation = router.follow(redirect).await;
    render::navigation(&mut std::io::stdout().lock(), &navigation)?;
    Ok(())
}

pub async fn logout<B: ShopBackend>(state: &AppState<B>) -> Result<()> {
    let redirect = state.auth().logout()?;
    let navigation = state.router().follow(redirect).await;
    render::navigation(&mut std::io::stdout().lock(), &navigation)?;
    Ok(())
}

/// Navigate to `path` and print where the router lands.
pub async fn visit<B: ShopBackend>(state: &AppState<B>, path: &str) -> Result<()> {
    let navigation = state
        .router()
        .navigate(path, NavigationState::default())
        .await;
    render::navigation(&mut std::io::stdout().lock(), &navigation)?;
    Ok(())
}

/// Run the admin guard; fail unless the admin page may render.
pub async fn require_admin<B: ShopBackend>(state: &AppState<B>) -> Result<()> {
    match state
        .router()
        .navigate(pawshop_core::route::ADMIN_LANDING_PATH, NavigationState::default())
        .await
    {
        Navigation::Rendered(route) if route.category() == pawshop_core::RouteCategory::Admin => {
            Ok(())
        }
        _ => Err(CommandError::NotSignedIn),
    }
}
