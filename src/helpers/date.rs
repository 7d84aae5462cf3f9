//! Date helper functions

use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, Locale};
use chrono_tz::Tz;

use crate::config::SiteConfig;

/// Formats CMS publication timestamps for display
#[derive(Debug, Clone)]
pub struct DateFormatter {
    /// chrono format string
    format: String,
    locale: Locale,
    timezone: Tz,
}

impl DateFormatter {
    /// Create a formatter from a date-fns pattern, a language tag and an IANA timezone
    ///
    /// # Examples
    /// ```ignore
    /// DateFormatter::new("dd MMM yyyy", "pt-BR", "UTC")?.format("2021-03-25T19:25:28+0000")
    /// // -> Some("25 mar 2021")
    /// ```
    pub fn new(pattern: &str, language: &str, timezone: &str) -> Result<Self> {
        let locale = locale_for(language).unwrap_or_else(|| {
            tracing::warn!("Unsupported language {:?}, formatting dates in en-US", language);
            Locale::en_US
        });
        let timezone: Tz = timezone
            .parse()
            .map_err(|e| anyhow!("Invalid timezone {:?}: {}", timezone, e))?;

        Ok(Self {
            format: date_fns_to_chrono_format(pattern),
            locale,
            timezone,
        })
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        Self::new(&config.date_format, &config.language, &config.timezone)
    }

    /// Format a raw CMS timestamp, `None` when missing or unparseable
    pub fn format(&self, raw: Option<&str>) -> Option<String> {
        let date = parse_timestamp(raw?)?;
        Some(self.format_date(&date))
    }

    pub fn format_date(&self, date: &DateTime<FixedOffset>) -> String {
        date.with_timezone(&self.timezone)
            .format_localized(&self.format, self.locale)
            .to_string()
    }
}

/// Parse a CMS timestamp
///
/// The API emits `2021-03-15T19:25:28+0000` (offset without colon); RFC 3339
/// is accepted as well.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

/// Map a BCP 47 language tag to a chrono locale
fn locale_for(language: &str) -> Option<Locale> {
    let locale = match language.replace('_', "-").to_ascii_lowercase().as_str() {
        "pt-br" | "pt" => Locale::pt_BR,
        "pt-pt" => Locale::pt_PT,
        "en" | "en-us" => Locale::en_US,
        "en-gb" => Locale::en_GB,
        "es" | "es-es" => Locale::es_ES,
        "fr" | "fr-fr" => Locale::fr_FR,
        "de" | "de-de" => Locale::de_DE,
        "it" | "it-it" => Locale::it_IT,
        _ => return None,
    };
    Some(locale)
}

/// Convert a date-fns format pattern to a chrono format string
fn date_fns_to_chrono_format(pattern: &str) -> String {
    // Longest tokens first within each letter so shorter ones never match
    // inside an already converted run
    let replacements = [
        // Year
        ("yyyy", "%Y"),
        ("yy", "%y"),
        // Month
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        // Day of month
        ("dd", "%d"),
        // Weekday
        ("EEEE", "%A"),
        ("EEE", "%a"),
        // Hour, minute, second
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
    ];

    let mut result = pattern.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pt_br() {
        let formatter = DateFormatter::new("dd MMM yyyy", "pt-BR", "UTC").unwrap();
        assert_eq!(
            formatter.format(Some("2021-03-25T19:25:28+0000")).as_deref(),
            Some("25 mar 2021")
        );
        assert_eq!(
            formatter.format(Some("2021-04-05T10:00:00+00:00")).as_deref(),
            Some("05 abr 2021")
        );
    }

    #[test]
    fn test_format_en() {
        let formatter = DateFormatter::new("dd MMM yyyy", "en-US", "UTC").unwrap();
        assert_eq!(
            formatter.format(Some("2021-03-25T19:25:28+0000")).as_deref(),
            Some("25 Mar 2021")
        );
    }

    #[test]
    fn test_format_in_timezone() {
        let formatter = DateFormatter::new("dd MMM yyyy", "pt-BR", "America/Sao_Paulo").unwrap();
        assert_eq!(
            formatter.format(Some("2021-03-01T01:00:00+0000")).as_deref(),
            Some("28 fev 2021")
        );
    }

    #[test]
    fn test_missing_or_invalid_timestamp() {
        let formatter = DateFormatter::new("dd MMM yyyy", "pt-BR", "UTC").unwrap();
        assert_eq!(formatter.format(None), None);
        assert_eq!(formatter.format(Some("not a date")), None);
    }

    #[test]
    fn test_invalid_timezone() {
        assert!(DateFormatter::new("dd MMM yyyy", "pt-BR", "Mars/Olympus").is_err());
    }

    #[test]
    fn test_date_fns_to_chrono() {
        assert_eq!(date_fns_to_chrono_format("dd MMM yyyy"), "%d %b %Y");
        assert_eq!(date_fns_to_chrono_format("yyyy-MM-dd HH:mm"), "%Y-%m-%d %H:%M");
    }
}
