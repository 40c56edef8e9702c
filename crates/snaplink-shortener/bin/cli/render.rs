use jiff::Timestamp;
use snaplink_core::LinkRecord;
use snaplink_shortener::{is_expired, time_remaining};
use std::fmt::Write;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

fn format_time(ts: Timestamp) -> String {
    ts.strftime(TIME_FORMAT).to_string()
}

/// Renders the link table: one line per record, keyed by its position.
pub fn link_table(records: &[(usize, LinkRecord)], base_url: &str, now: Timestamp) -> String {
    if records.is_empty() {
        return "No shortened URLs found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<32}  {:<40}  {:<23}  {:<31}  {:<16}  {:>6}",
        "#", "Short URL", "Original URL", "Created", "Expiry", "Time Left", "Clicks"
    );
    for (index, record) in records {
        let expiry = if is_expired(record, now) {
            format!("{} [expired]", format_time(record.expires_at()))
        } else {
            format_time(record.expires_at())
        };
        let _ = writeln!(
            out,
            "{:>3}  {:<32}  {:<40}  {:<23}  {:<31}  {:<16}  {:>6}",
            index,
            record.shortcode().to_url(base_url),
            record.long_url(),
            format_time(record.created_at()),
            expiry,
            time_remaining(record, now).to_string(),
            record.click_count(),
        );
    }
    out
}

/// Renders the click log of a single record.
pub fn click_log(record: &LinkRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Click Details for {}", record.shortcode());
    if record.clicks().is_empty() {
        out.push_str("No click data.\n");
        return out;
    }

    let _ = writeln!(out, "{:<23}  {:<16}  {}", "Timestamp", "Source", "Geo");
    for click in record.clicks() {
        let _ = writeln!(
            out,
            "{:<23}  {:<16}  {}",
            format_time(click.timestamp),
            click.source,
            click.geo
        );
    }
    out
}
