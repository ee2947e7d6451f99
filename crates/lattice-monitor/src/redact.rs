//! Masking of sensitive network addresses in dump output.
//!
//! Registry values routinely carry server addresses. Responses pass through a
//! redactor before leaving the process so a diagnostic dump never leaks the
//! cluster topology to whoever can reach the monitor port.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static IPV4_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("IPv4 pattern compiles"));

/// Masks sensitive substrings in response lines before transmission.
pub trait LineRedactor: Send + Sync {
    /// Returns the lines with sensitive substrings replaced.
    fn redact(&self, lines: Vec<String>) -> Vec<String>;
}

/// Default redactor masking IPv4-shaped substrings.
///
/// Each distinct address becomes `ip_address_<n>`, numbered in order of
/// first appearance across the whole response, so repeated addresses stay
/// correlated after masking.
#[derive(Debug, Default, Clone, Copy)]
pub struct IpRedactor;

impl IpRedactor {
    /// Builds the default redactor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LineRedactor for IpRedactor {
    fn redact(&self, lines: Vec<String>) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        lines
            .into_iter()
            .map(|line| {
                IPV4_PATTERN
                    .replace_all(&line, |captures: &Captures<'_>| {
                        let address = captures[0].to_owned();
                        let index = seen
                            .iter()
                            .position(|known| *known == address)
                            .unwrap_or_else(|| {
                                seen.push(address);
                                seen.len() - 1
                            });
                        format!("ip_address_{index}")
                    })
                    .into_owned()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redact(lines: &[&str]) -> Vec<String> {
        IpRedactor::new().redact(lines.iter().map(|line| (*line).to_owned()).collect())
    }

    #[test]
    fn masks_addresses_in_place() {
        let lines = redact(&["/job/servers/10.0.0.7 | ready"]);
        assert_eq!(lines, vec!["/job/servers/ip_address_0 | ready"]);
    }

    #[test]
    fn repeated_addresses_share_a_placeholder() {
        let lines = redact(&[
            "/job/leader | 10.0.0.7:9001",
            "/job/servers/10.0.0.7 | ready",
            "/job/servers/10.0.0.8 | ready",
        ]);
        assert_eq!(
            lines,
            vec![
                "/job/leader | ip_address_0:9001",
                "/job/servers/ip_address_0 | ready",
                "/job/servers/ip_address_1 | ready",
            ]
        );
    }

    #[test]
    fn leaves_non_address_text_untouched() {
        let lines = redact(&["/job/config | cron=0 0 * * *"]);
        assert_eq!(lines, vec!["/job/config | cron=0 0 * * *"]);
    }
}
