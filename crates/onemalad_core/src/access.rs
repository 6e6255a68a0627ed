//! Role gates for the dashboard pages.

use crate::schema::{UserProfile, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Admin,
    CorporatorPanel,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
}

pub fn gate(user: Option<&UserProfile>, page: Page) -> Access {
    let Some(user) = user else {
        return Access::Denied;
    };
    let allowed = match page {
        Page::Admin => user.role == UserRole::Admin,
        Page::CorporatorPanel => matches!(user.role, UserRole::Corporator | UserRole::Admin),
        Page::Dashboard => true,
    };
    if allowed { Access::Granted } else { Access::Denied }
}
