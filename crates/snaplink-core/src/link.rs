use crate::error::CoreError;
use crate::shortcode::Shortcode;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::num::IntErrorKind;
use url::Url;

/// Validity used whenever the submitted window is not a positive integer.
pub const DEFAULT_VALIDITY_MINUTES: u32 = 30;

/// Upper bound on a validity window (1000 years), keeps `expires_at` inside
/// the representable timestamp range.
pub const MAX_VALIDITY_MINUTES: u32 = 1_000 * 366 * 24 * 60;

/// Parses a long URL, requiring it to be absolute.
pub fn parse_long_url(input: &str) -> Result<Url, CoreError> {
    Url::parse(input).map_err(|e| CoreError::InvalidUrl(format!("{input}: {e}")))
}

/// One dereference of a short link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub timestamp: Timestamp,
    /// The UI context that produced the click.
    pub source: String,
    /// Coarse geographic origin, best effort.
    pub geo: String,
}

impl ClickEvent {
    pub fn new(timestamp: Timestamp, source: impl Into<String>, geo: impl Into<String>) -> Self {
        Self {
            timestamp,
            source: source.into(),
            geo: geo.into(),
        }
    }
}

/// A shortened link and its click history.
///
/// Field names serialize in camelCase, matching the persisted snapshot
/// layout (`longUrl`, `shortcode`, `createdAt`, `expiresAt`, `clickCount`,
/// `clicks`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    long_url: String,
    shortcode: Shortcode,
    created_at: Timestamp,
    expires_at: Timestamp,
    #[serde(default)]
    click_count: u64,
    #[serde(default)]
    clicks: Vec<ClickEvent>,
}

impl LinkRecord {
    /// Creates a record with no clicks, expiring `validity` after `created_at`.
    pub fn new(
        long_url: impl Into<String>,
        shortcode: Shortcode,
        validity: ValidityWindow,
        created_at: Timestamp,
    ) -> Self {
        Self {
            long_url: long_url.into(),
            shortcode,
            created_at,
            expires_at: created_at + validity.as_duration(),
            click_count: 0,
            clicks: Vec::new(),
        }
    }

    pub fn long_url(&self) -> &str {
        &self.long_url
    }

    pub fn shortcode(&self) -> &Shortcode {
        &self.shortcode
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    pub fn click_count(&self) -> u64 {
        self.click_count
    }

    /// Clicks in the order they were recorded.
    pub fn clicks(&self) -> &[ClickEvent] {
        &self.clicks
    }

    /// Appends a click and bumps the counter.
    pub fn push_click(&mut self, event: ClickEvent) {
        self.clicks.push(event);
        self.click_count = self.clicks.len() as u64;
    }

    /// Realigns `click_count` with the click log.
    ///
    /// Returns `true` if the stored counter disagreed with the log.
    pub fn reconcile_click_count(&mut self) -> bool {
        let actual = self.clicks.len() as u64;
        let drifted = self.click_count != actual;
        self.click_count = actual;
        drifted
    }

    /// A record is expired from `expires_at` onwards (boundary inclusive).
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    pub fn time_remaining(&self, now: Timestamp) -> TimeRemaining {
        TimeRemaining::between(now, self.expires_at)
    }
}

/// Number of minutes a link stays active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidityWindow(u32);

impl ValidityWindow {
    /// Uses `minutes` when it is positive, capped at
    /// [`MAX_VALIDITY_MINUTES`], and the 30 minute default otherwise.
    pub fn from_minutes(minutes: i64) -> Self {
        if minutes < 1 {
            return Self::default();
        }
        Self(minutes.min(i64::from(MAX_VALIDITY_MINUTES)) as u32)
    }

    /// The longest window a link can have.
    pub fn max() -> Self {
        Self(MAX_VALIDITY_MINUTES)
    }

    /// Parses form input the way a browser `parseInt` would: leading
    /// whitespace and an optional sign, then as many digits as are present.
    /// Anything that does not yield a positive count gives the default;
    /// counts too large to represent are capped like [`Self::from_minutes`].
    pub fn parse_lenient(input: &str) -> Self {
        let trimmed = input.trim_start();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());

        match rest[..end].parse::<i64>() {
            Ok(minutes) if !negative => Self::from_minutes(minutes),
            Err(err) if !negative && *err.kind() == IntErrorKind::PosOverflow => Self::max(),
            _ => Self::default(),
        }
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    pub fn as_duration(&self) -> SignedDuration {
        SignedDuration::from_mins(i64::from(self.0))
    }
}

impl Default for ValidityWindow {
    fn default() -> Self {
        Self(DEFAULT_VALIDITY_MINUTES)
    }
}

/// Time left before a link expires, at whole-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRemaining {
    Expired,
    Left { hours: u64, minutes: u8, seconds: u8 },
}

impl TimeRemaining {
    /// Computes the time left from `now` until `expires_at`. Sub-second
    /// remainders are floored, so the last partial second reads `0s left`.
    pub fn between(now: Timestamp, expires_at: Timestamp) -> Self {
        if now >= expires_at {
            return Self::Expired;
        }

        let total = expires_at.duration_since(now).as_secs().max(0) as u64;
        Self::Left {
            hours: total / 3600,
            minutes: ((total % 3600) / 60) as u8,
            seconds: (total % 60) as u8,
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }

    /// Whole seconds left; zero once expired.
    pub fn as_secs(&self) -> u64 {
        match *self {
            Self::Expired => 0,
            Self::Left {
                hours,
                minutes,
                seconds,
            } => hours * 3600 + u64::from(minutes) * 60 + u64::from(seconds),
        }
    }
}

impl Display for TimeRemaining {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Expired => f.write_str("Expired"),
            Self::Left {
                hours,
                minutes,
                seconds,
            } => {
                if hours > 0 {
                    write!(f, "{hours}h ")?;
                }
                if hours > 0 || minutes > 0 {
                    write!(f, "{minutes}m ")?;
                }
                write!(f, "{seconds}s left")
            }
        }
    }
}

/// Addresses a record either by its position in the registry or by code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkRef {
    /// 0-based position in insertion order.
    Index(usize),
    Code(Shortcode),
}

impl From<usize> for LinkRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<Shortcode> for LinkRef {
    fn from(code: Shortcode) -> Self {
        Self::Code(code)
    }
}

impl From<&Shortcode> for LinkRef {
    fn from(code: &Shortcode) -> Self {
        Self::Code(code.clone())
    }
}

impl Display for LinkRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Code(code) => write!(f, "{code}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(second: i64) -> Timestamp {
        Timestamp::from_second(second).unwrap()
    }

    fn record(validity: ValidityWindow) -> LinkRecord {
        LinkRecord::new(
            "https://example.com",
            Shortcode::new_unchecked("abc12"),
            validity,
            ts(1_000),
        )
    }

    #[test]
    fn new_record_expires_after_window() {
        let record = record(ValidityWindow::from_minutes(45));
        assert_eq!(
            record.expires_at().duration_since(record.created_at()),
            SignedDuration::from_mins(45)
        );
        assert!(record.expires_at() > record.created_at());
        assert_eq!(record.click_count(), 0);
        assert!(record.clicks().is_empty());
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let record = record(ValidityWindow::from_minutes(1));
        let expires_at = record.expires_at();

        assert!(!record.is_expired(expires_at - SignedDuration::from_nanos(1)));
        assert!(record.is_expired(expires_at));
        assert!(record.is_expired(expires_at + SignedDuration::from_secs(1)));
    }

    #[test]
    fn push_click_keeps_count_in_step() {
        let mut record = record(ValidityWindow::default());
        for i in 0..3 {
            record.push_click(ClickEvent::new(ts(1_001 + i), "stats-page", "India"));
        }
        assert_eq!(record.click_count(), 3);
        assert_eq!(record.clicks().len(), 3);
        assert_eq!(record.clicks()[0].timestamp, ts(1_001));
        assert_eq!(record.clicks()[2].timestamp, ts(1_003));
    }

    #[test]
    fn reconcile_repairs_drifted_count() {
        let raw = r#"{
            "longUrl": "https://example.com",
            "shortcode": "abc12",
            "createdAt": "2026-01-01T00:00:00Z",
            "expiresAt": "2026-01-01T00:30:00Z",
            "clickCount": 7,
            "clicks": [
                {"timestamp": "2026-01-01T00:01:00Z", "source": "stats-page", "geo": "India"}
            ]
        }"#;
        let mut record: LinkRecord = serde_json::from_str(raw).unwrap();

        assert!(record.reconcile_click_count());
        assert_eq!(record.click_count(), 1);
        assert!(!record.reconcile_click_count());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let record = record(ValidityWindow::default());
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["longUrl"], "https://example.com");
        assert_eq!(value["shortcode"], "abc12");
        assert_eq!(value["createdAt"], "1970-01-01T00:16:40Z");
        assert_eq!(value["expiresAt"], "1970-01-01T00:46:40Z");
        assert_eq!(value["clickCount"], 0);
        assert!(value["clicks"].as_array().unwrap().is_empty());
    }

    #[test]
    fn validity_defaults_for_non_positive() {
        assert_eq!(ValidityWindow::from_minutes(0).minutes(), 30);
        assert_eq!(ValidityWindow::from_minutes(-5).minutes(), 30);
        assert_eq!(ValidityWindow::from_minutes(1).minutes(), 1);
        assert_eq!(ValidityWindow::from_minutes(120).minutes(), 120);
    }

    #[test]
    fn validity_parses_like_form_input() {
        assert_eq!(ValidityWindow::parse_lenient("45").minutes(), 45);
        assert_eq!(ValidityWindow::parse_lenient("  45min").minutes(), 45);
        assert_eq!(ValidityWindow::parse_lenient("+10").minutes(), 10);
        assert_eq!(ValidityWindow::parse_lenient("").minutes(), 30);
        assert_eq!(ValidityWindow::parse_lenient("abc").minutes(), 30);
        assert_eq!(ValidityWindow::parse_lenient("0").minutes(), 30);
        assert_eq!(ValidityWindow::parse_lenient("-15").minutes(), 30);
        assert_eq!(ValidityWindow::parse_lenient("-99999999999999999999").minutes(), 30);
    }

    #[test]
    fn oversized_validity_is_capped() {
        let max = ValidityWindow::max();
        assert_eq!(max.minutes(), MAX_VALIDITY_MINUTES);
        assert_eq!(ValidityWindow::from_minutes(i64::MAX), max);
        assert_eq!(
            ValidityWindow::from_minutes(i64::from(MAX_VALIDITY_MINUTES) + 1),
            max
        );
        assert_eq!(ValidityWindow::parse_lenient("99999999999999999999"), max);

        let record = record(max);
        assert!(record.expires_at() > record.created_at());
    }

    #[test]
    fn time_remaining_decomposes_units() {
        let now = ts(0);
        let left = TimeRemaining::between(now, ts(3_723));
        assert_eq!(
            left,
            TimeRemaining::Left {
                hours: 1,
                minutes: 2,
                seconds: 3
            }
        );
        assert_eq!(left.as_secs(), 3_723);
    }

    #[test]
    fn time_remaining_formatting() {
        let now = ts(0);
        assert_eq!(TimeRemaining::between(now, ts(3_723)).to_string(), "1h 2m 3s left");
        assert_eq!(TimeRemaining::between(now, ts(3_605)).to_string(), "1h 0m 5s left");
        assert_eq!(TimeRemaining::between(now, ts(240)).to_string(), "4m 0s left");
        assert_eq!(TimeRemaining::between(now, ts(9)).to_string(), "9s left");
        assert_eq!(TimeRemaining::between(now, ts(0)).to_string(), "Expired");
        assert_eq!(TimeRemaining::between(ts(10), ts(0)).to_string(), "Expired");
    }

    #[test]
    fn final_partial_second_is_not_expired() {
        let now = ts(0);
        let expires_at = now + SignedDuration::from_millis(500);
        let left = TimeRemaining::between(now, expires_at);

        assert!(!left.is_expired());
        assert_eq!(left.to_string(), "0s left");
    }

    #[test]
    fn parse_long_url_requires_absolute() {
        assert!(parse_long_url("https://example.com").is_ok());
        assert!(parse_long_url("http://localhost:8080/a?b=c").is_ok());
        assert!(matches!(
            parse_long_url("not-a-url"),
            Err(CoreError::InvalidUrl(_))
        ));
        assert!(parse_long_url("/relative/path").is_err());
        assert!(parse_long_url("").is_err());
    }

    #[test]
    fn link_ref_display() {
        assert_eq!(LinkRef::from(3usize).to_string(), "#3");
        assert_eq!(
            LinkRef::from(Shortcode::new_unchecked("abc12")).to_string(),
            "abc12"
        );
    }
}
