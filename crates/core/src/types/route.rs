//! Navigation surface: public pages, the admin group, and the login page.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Path of the login page.
pub const LOGIN_PATH: &str = "/login";
/// Landing page of the admin group.
pub const ADMIN_LANDING_PATH: &str = "/admin/product";

/// Which guard, if any, protects a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteCategory {
    /// Requires a validated admin session.
    Admin,
    /// Only useful to signed-out users; signed-in admins are sent onward.
    Login,
    /// Open to everyone.
    Public,
}

impl RouteCategory {
    /// Whether the session guard runs for this category.
    #[must_use]
    pub const fn is_guarded(self) -> bool {
        !matches!(self, Self::Public)
    }
}

/// A resolved route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// Storefront home page.
    Home,
    /// Product listing.
    Products,
    /// Product detail page.
    Product(ProductId),
    /// Cart page.
    Cart,
    /// Checkout page.
    Checkout,
    /// Admin product manager.
    AdminProducts,
    /// Admin sign-in.
    Login,
    /// Nothing matched.
    NotFound(String),
}

impl Route {
    /// Resolve a path (query string and fragment are ignored).
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["products"] => Self::Products,
            ["product", id] if !id.is_empty() => Self::Product(ProductId::new(*id)),
            ["cart"] => Self::Cart,
            ["checkout"] => Self::Checkout,
            ["admin"] | ["admin", "product"] => Self::AdminProducts,
            ["login"] => Self::Login,
            _ => Self::NotFound(path.to_owned()),
        }
    }

    /// The canonical path for this route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Products => "/products".to_string(),
            Self::Product(id) => format!("/product/{id}"),
            Self::Cart => "/cart".to_string(),
            Self::Checkout => "/checkout".to_string(),
            Self::AdminProducts => ADMIN_LANDING_PATH.to_string(),
            Self::Login => LOGIN_PATH.to_string(),
            Self::NotFound(path) => path.clone(),
        }
    }

    /// Guard category. Unknown paths under `/admin` stay admin-only.
    #[must_use]
    pub fn category(&self) -> RouteCategory {
        match self {
            Self::AdminProducts => RouteCategory::Admin,
            Self::Login => RouteCategory::Login,
            Self::NotFound(path) if is_admin_path(path) => RouteCategory::Admin,
            _ => RouteCategory::Public,
        }
    }
}

fn is_admin_path(path: &str) -> bool {
    path == "/admin" || path.starts_with("/admin/")
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// State attached to a navigation by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NavigationState {
    /// The caller vouches that the admin session was just validated
    /// (set by the post-login redirect), so the guard may skip its check.
    pub skip_auth_check: bool,
}

impl NavigationState {
    /// State that lets the admin guard skip its server check.
    #[must_use]
    pub const fn vouched() -> Self {
        Self {
            skip_auth_check: true,
        }
    }
}

/// A navigation the client should perform instead of rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    /// Destination.
    pub to: Route,
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
    /// State passed along with the navigation.
    pub state: NavigationState,
}

impl Redirect {
    /// Replace-redirect with no extra state.
    #[must_use]
    pub const fn replace(to: Route) -> Self {
        Self {
            to,
            replace: true,
            state: NavigationState {
                skip_auth_check: false,
            },
        }
    }

    /// Push-navigation with no extra state.
    #[must_use]
    pub const fn push(to: Route) -> Self {
        Self {
            to,
            replace: false,
            state: NavigationState {
                skip_auth_check: false,
            },
        }
    }

    /// Attach navigation state.
    #[must_use]
    pub const fn with_state(mut self, state: NavigationState) -> Self {
        self.state = state;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_public_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/products"), Route::Products);
        assert_eq!(Route::parse("/products/"), Route::Products);
        assert_eq!(
            Route::parse("/product/-Nabc?ref=home"),
            Route::Product(ProductId::new("-Nabc"))
        );
        assert_eq!(Route::parse("/cart"), Route::Cart);
        assert_eq!(Route::parse("/checkout#summary"), Route::Checkout);
    }

    #[test]
    fn test_parse_guarded_routes() {
        assert_eq!(Route::parse("/admin/product"), Route::AdminProducts);
        assert_eq!(Route::parse("/admin"), Route::AdminProducts);
        assert_eq!(Route::parse("/login"), Route::Login);
    }

    #[test]
    fn test_parse_not_found() {
        assert_eq!(
            Route::parse("/nope"),
            Route::NotFound("/nope".to_string())
        );
        assert_eq!(
            Route::parse("/product/"),
            Route::NotFound("/product/".to_string())
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(Route::AdminProducts.category(), RouteCategory::Admin);
        assert_eq!(Route::Login.category(), RouteCategory::Login);
        assert_eq!(Route::Cart.category(), RouteCategory::Public);
        assert_eq!(
            Route::parse("/admin/orders").category(),
            RouteCategory::Admin
        );
        assert_eq!(Route::parse("/administrator").category(), RouteCategory::Public);
        assert!(!RouteCategory::Public.is_guarded());
    }

    #[test]
    fn test_path_roundtrip() {
        for path in ["/", "/products", "/product/p-1", "/cart", "/checkout", "/admin/product", "/login"] {
            assert_eq!(Route::parse(path).path(), path);
        }
    }

    #[test]
    fn test_redirect_constructors() {
        let redirect = Redirect::replace(Route::AdminProducts).with_state(NavigationState::vouched());
        assert!(redirect.replace);
        assert!(redirect.state.skip_auth_check);
        assert!(!Redirect::push(Route::Cart).replace);
    }
}
