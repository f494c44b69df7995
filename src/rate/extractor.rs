//! Extraction of a rate value from page text.

use regex::Regex;

use super::FetchError;

/// Default pattern: the first `<div class="bi rate-value">` element.
pub const DEFAULT_PATTERN: &str = r#"<div[^>]*class="bi rate-value"[^>]*>\s*([^<]+?)\s*</div>"#;

/// Pulls a numeric rate out of a response body with a regex.
///
/// The first capture group of the first match is the rate text. Both `.`
/// and `,` are accepted as decimal separators, and spaces (including
/// non-breaking ones) used as digit grouping are ignored.
#[derive(Debug, Clone)]
pub struct RateExtractor {
    pattern: Regex,
}

impl RateExtractor {
    /// Compiles an extractor from a pattern.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the pattern does not compile.
    /// A pattern without a capture group compiles but never extracts anything;
    /// use [`RateExtractor::has_capture_group`] to reject it up front.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Returns the source pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Returns true if the pattern defines at least one capture group.
    #[must_use]
    pub fn has_capture_group(&self) -> bool {
        self.pattern.captures_len() > 1
    }

    /// Extracts the rate from `body`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::NotFound`] if the pattern does not match
    /// - [`FetchError::Parse`] if the captured text is not a number
    /// - [`FetchError::NonFinite`] if the number is NaN or infinite
    pub fn extract(&self, body: &str) -> Result<f64, FetchError> {
        let text = self
            .pattern
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or(FetchError::NotFound)?;

        parse_rate(text)
    }
}

impl Default for RateExtractor {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_PATTERN).expect("default rate pattern is a valid regex"),
        }
    }
}

fn parse_rate(text: &str) -> Result<f64, FetchError> {
    let normalized: String = text
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let value = normalized
        .parse::<f64>()
        .map_err(|_| FetchError::Parse {
            text: text.to_string(),
        })?;

    if !value.is_finite() {
        return Err(FetchError::NonFinite { value });
    }

    Ok(value)
}
