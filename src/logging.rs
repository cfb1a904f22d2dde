//! Log hygiene helpers.
//!
//! Keeps provider secrets out of log lines and terminal output.

use std::fmt;

/// Redacted API key representation
///
/// Shows at most the first 8 characters followed by `***`.
#[derive(Clone, Debug)]
pub struct SensitiveApiKey<'a> {
    inner: &'a str,
}

impl<'a> SensitiveApiKey<'a> {
    /// ```
    /// use ecocycle_classifier::logging::SensitiveApiKey;
    ///
    /// let sanitized = SensitiveApiKey::new("gsk_abcdef1234567890");
    /// assert_eq!(format!("{}", sanitized), "gsk_abcd***");
    /// ```
    pub fn new(key: &'a str) -> Self {
        Self { inner: key }
    }
}

impl<'a> fmt::Display for SensitiveApiKey<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys too short to keep a prefix are hidden entirely
        let visible_len = 8;
        match self.inner.get(..visible_len) {
            Some(prefix) if self.inner.len() > visible_len => write!(f, "{}***", prefix),
            _ => write!(f, "***"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_api_key_display() {
        let sanitized = SensitiveApiKey::new("gsk_live_abcdef123456");
        assert_eq!(format!("{}", sanitized), "gsk_live***");
    }

    #[test]
    fn test_sensitive_api_key_short() {
        assert_eq!(SensitiveApiKey::new("gsk_abc").to_string(), "***");
        assert_eq!(SensitiveApiKey::new("12345678").to_string(), "***");
    }

    #[test]
    fn test_sensitive_api_key_multibyte() {
        // Prefix boundary falls inside a multi-byte character
        assert_eq!(SensitiveApiKey::new("aéééé").to_string(), "***");
    }
}
