//! [`Navigation`] definitions.

use crate::domain::user::Session;
#[cfg(doc)]
use crate::domain::User;

/// Single navigation link.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Item {
    /// Human-readable label of this [`Item`].
    pub label: &'static str,

    /// Path this [`Item`] leads to.
    pub href: &'static str,
}

impl Item {
    /// Creates a new [`Item`].
    const fn new(label: &'static str, href: &'static str) -> Self {
        Self { label, href }
    }
}

/// Items available to everyone.
const PUBLIC: &[Item] = &[
    Item::new("Houses", "/houses"),
    Item::new("Rooms", "/rooms"),
    Item::new("About us", "/about"),
];

/// Items available to administrators.
const ADMIN: &[Item] = &[
    Item::new("Houses", "/admin/houses"),
    Item::new("Rooms", "/admin/rooms"),
    Item::new("Users", "/admin/users"),
];

/// Navigation links available in a [`Session`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Navigation {
    /// Main navigation [`Item`]s.
    pub items: &'static [Item],

    /// Account [`Item`], either leading to a profile or to a login page.
    pub account: Item,
}

impl Navigation {
    /// Resolves the [`Navigation`] of the provided [`Session`].
    ///
    /// Anonymous [`User`]s (without a [`Session`]) are offered to log in.
    #[must_use]
    pub fn for_session(session: Option<&Session>) -> Self {
        match session {
            None => Self {
                items: PUBLIC,
                account: Item::new("Login", "/auth/login/"),
            },
            Some(s) if s.is_admin() => Self {
                items: ADMIN,
                account: Item::new("Profile", "/admin/profile"),
            },
            Some(_) => Self {
                items: PUBLIC,
                account: Item::new("Profile", "/profile"),
            },
        }
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use uuid::Uuid;

    use crate::domain::user::{self, Session};

    use super::Navigation;

    fn session(role: user::Role) -> Session {
        Session {
            user_id: user::Id::from(Uuid::nil()),
            role,
            expires_at: DateTime::now().coerce(),
        }
    }

    fn hrefs(nav: &Navigation) -> Vec<&'static str> {
        nav.items.iter().map(|i| i.href).collect()
    }

    #[test]
    fn anonymous_gets_public_items_and_login() {
        let nav = Navigation::for_session(None);

        assert_eq!(hrefs(&nav), ["/houses", "/rooms", "/about"]);
        assert_eq!(nav.account.label, "Login");
        assert_eq!(nav.account.href, "/auth/login/");
    }

    #[test]
    fn user_gets_public_items_and_profile() {
        let nav = Navigation::for_session(Some(&session(user::Role::User)));

        assert_eq!(hrefs(&nav), ["/houses", "/rooms", "/about"]);
        assert_eq!(nav.account.label, "Profile");
        assert_eq!(nav.account.href, "/profile");
    }

    #[test]
    fn admin_gets_admin_items_and_admin_profile() {
        let nav = Navigation::for_session(Some(&session(user::Role::Admin)));

        assert_eq!(
            hrefs(&nav),
            ["/admin/houses", "/admin/rooms", "/admin/users"],
        );
        assert_eq!(
            nav.items.iter().map(|i| i.label).collect::<Vec<_>>(),
            ["Houses", "Rooms", "Users"],
        );
        assert_eq!(nav.account.href, "/admin/profile");
    }
}
