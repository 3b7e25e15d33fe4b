//! Role hierarchy used to gate client affordances.
//!
//! Evaluated client-side only to hide or disable actions; the API enforces
//! access on its own.

pub const ADMIN: &str = "admin";
pub const EDITOR: &str = "editor";
pub const USER: &str = "user";

/// Direct implications: holding the left role also grants the right ones.
const HIERARCHY: &[(&str, &[&str])] = &[(ADMIN, &[EDITOR]), (EDITOR, &[USER])];

fn implied_by(role: &str) -> &'static [&'static str] {
    HIERARCHY
        .iter()
        .find(|(held, _)| *held == role)
        .map(|&(_, implied)| implied)
        .unwrap_or_default()
}

/// Whether `held` grants `role`, either directly or through the hierarchy.
pub fn is_role_granted<S: AsRef<str>>(role: &str, held: &[S]) -> bool {
    held.iter().any(|h| grants(h.as_ref(), role))
}

fn grants(held: &str, role: &str) -> bool {
    held == role || implied_by(held).iter().any(|next| grants(next, role))
}
