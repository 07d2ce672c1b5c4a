//! Email extraction from directory member records.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::DirectoryMember;

/// Structural email check: local part, domain with at least one dot, and a
/// 2+ letter top-level label. Syntactic only; exotic but valid addresses may
/// be rejected, invalid ones never pass.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid regex")
});

/// Derives a usable email for a member: `mail` preferred, then
/// `userPrincipalName`. Returns None when neither yields a value that looks
/// like an email address.
pub fn extract_email(member: &DirectoryMember) -> Option<String> {
    let email = member
        .mail
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or(member.user_principal_name.as_deref())?
        .trim();

    if email.is_empty() || !email.contains('@') {
        return None;
    }

    if !EMAIL_RE.is_match(email) {
        return None;
    }

    Some(email.to_string())
}
