//! Redaction of credentials in text destined for logs or the terminal.

use once_cell::sync::Lazy;
use regex::Regex;

const REPLACEMENT: &str = "[REDACTED]";

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization:\s*)([^\r\n]+)",
        r"(?i)(access_token=)([^;\s]+)",
        r"(?i)([A-Z0-9_]*?(?:KEY|TOKEN|SECRET|PASSWORD)=)([^\s;]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Replaces values that look like secrets, keeping the key names for debugging.
///
/// ```rust
/// use area_util::redact_sensitive;
///
/// assert_eq!(redact_sensitive("cookie: access_token=abc.def"), "cookie: access_token=[REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in REDACT_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{REPLACEMENT}")
            })
            .into_owned();
    }
    redacted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_session_cookie_and_env_style_tokens() {
        assert_eq!(
            redact_sensitive("access_token=eyJhbGciOi; theme=dark"),
            "access_token=[REDACTED]; theme=dark"
        );
        assert_eq!(redact_sensitive("AREA_SESSION_TOKEN=xyz other"), "AREA_SESSION_TOKEN=[REDACTED] other");
        assert_eq!(redact_sensitive("Authorization: Bearer abc"), "Authorization: [REDACTED]");
    }

    #[test]
    fn leaves_ordinary_text_alone() {
        assert_eq!(redact_sensitive("if new_issue, then send_message"), "if new_issue, then send_message");
    }
}
