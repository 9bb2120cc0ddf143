//! Account status, plan, and portfolio theme vocabulary.
//!
//! Stored as plain TEXT columns; these constants are the only values the
//! API ever writes.

/// Account may log in and publish.
pub const STATUS_ACTIVE: &str = "active";
/// Account disabled by an administrator.
pub const STATUS_SUSPENDED: &str = "suspended";
/// Account created but not yet activated.
pub const STATUS_PENDING: &str = "pending";

/// Default plan assigned at registration.
pub const PLAN_FREE: &str = "free";
/// Plan granted after an administrator confirms payment.
pub const PLAN_PREMIUM: &str = "premium";

/// Themes a portfolio may render with.
pub const THEMES: &[&str] = &["light", "dark", "blue", "green"];

/// Default theme for a freshly created portfolio.
pub const DEFAULT_THEME: &str = "light";

/// Whether `theme` names a supported portfolio theme.
pub fn is_valid_theme(theme: &str) -> bool {
    THEMES.contains(&theme)
}
