use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Centralized registry for PII redaction regex patterns.
///
/// All hardcoded redaction patterns live here, with a single allow per
/// construction site. The patterns are vetted literals.
pub struct PiiRegexRegistry;

impl PiiRegexRegistry {
    /// Email pattern: matches standard email addresses
    pub fn email() -> &'static Regex {
        static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap()
        });
        &EMAIL_REGEX
    }

    /// UUID pattern: magic-link tokens are v4 UUIDs
    pub fn uuid_token() -> &'static Regex {
        static UUID_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(
                r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b",
            )
            .unwrap()
        });
        &UUID_TOKEN_REGEX
    }

    /// Base64-like token pattern: session JWTs and API keys (≥16 chars)
    pub fn base64_token() -> &'static Regex {
        static BASE64_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"\b[A-Za-z0-9+/_.-]{32,}={0,2}\b").unwrap()
        });
        &BASE64_TOKEN_REGEX
    }
}

/// Redacts sensitive information from a string.
///
/// Conservatively masks:
/// - Emails: keeps the first character of the local part, replaces the rest
///   with ***, keeps the full domain
/// - Magic-link tokens (UUIDs) and opaque credentials (base64-like runs)
///   become [REDACTED_TOKEN]
///
/// Order: emails first, then tokens, to avoid double-processing.
pub fn redact(input: &str) -> String {
    let email_redacted = PiiRegexRegistry::email().replace_all(input, |caps: &regex::Captures| {
        let full_match = &caps[0];
        if let Some(at_pos) = full_match.find('@') {
            let local_part = &full_match[..at_pos];
            let domain = &full_match[at_pos..];

            if local_part.is_empty() {
                domain.to_string()
            } else {
                let first_char = &local_part[..1];
                format!("{first_char}***{domain}")
            }
        } else {
            full_match.to_string()
        }
    });

    let uuid_redacted =
        PiiRegexRegistry::uuid_token().replace_all(&email_redacted, "[REDACTED_TOKEN]");

    PiiRegexRegistry::base64_token()
        .replace_all(&uuid_redacted, "[REDACTED_TOKEN]")
        .to_string()
}

/// A wrapper that automatically redacts sensitive strings when displayed.
pub struct Redacted<'a>(pub &'a str);

impl<'a> fmt::Display for Redacted<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact(self.0))
    }
}

impl<'a> fmt::Debug for Redacted<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact(self.0))
    }
}
