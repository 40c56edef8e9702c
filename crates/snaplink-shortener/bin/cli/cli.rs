use clap::{Parser, Subcommand, ValueEnum};
use snaplink_core::ValidityWindow;
use snaplink_shortener::SubmissionRow;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const STORE_ENV: &str = "SNAPLINK_STORE";
pub const BASE_URL_ENV: &str = "SNAPLINK_BASE_URL";
pub const LOGGER_TOKEN_ENV: &str = "SNAPLINK_LOGGER_TOKEN";
pub const LOG_FORMAT_ENV: &str = "SNAPLINK_LOG_FORMAT";

pub const DEFAULT_STORE: &str = "snaplink.json";
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_SOURCE: &str = "stats-page";
pub const DEFAULT_GEO: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Text => write!(f, "text"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "snaplink", about = "Create short links and track their clicks")]
pub struct CLI {
    /// JSON file holding the link snapshot.
    #[arg(long, env = STORE_ENV, default_value = DEFAULT_STORE)]
    pub store: PathBuf,

    /// Origin short links are served from.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Bearer token attached to every notification.
    #[arg(long, env = LOGGER_TOKEN_ENV, default_value = "", hide_env_values = true)]
    pub logger_token: String,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Text
    )]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shorten one or more URLs as a single batch.
    Submit {
        /// `URL[,MINUTES[,CODE]]`; minutes default to 30, code is generated when blank.
        #[arg(required = true, value_parser = parse_row)]
        rows: Vec<SubmissionRow>,
    },
    /// Show short links with their remaining time.
    List {
        /// Include expired links.
        #[arg(long)]
        all: bool,
    },
    /// Record a click on a link and print its destination.
    Open {
        /// Short code, or 0-based position in the full list.
        target: String,
        #[arg(long, default_value = DEFAULT_SOURCE)]
        source: String,
        #[arg(long, default_value = DEFAULT_GEO)]
        geo: String,
    },
    /// Show the click log of a link.
    Clicks {
        /// Short code, or 0-based position in the full list.
        target: String,
    },
}

/// Parses `URL[,MINUTES[,CODE]]`.
pub fn parse_row(raw: &str) -> Result<SubmissionRow, String> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() > 3 {
        return Err(format!(
            "expected URL[,MINUTES[,CODE]], got {} comma-separated fields",
            parts.len()
        ));
    }

    let mut row = SubmissionRow::new(parts[0].trim());
    if let Some(minutes) = parts.get(1) {
        row = row.with_validity(ValidityWindow::parse_lenient(minutes));
    }
    if let Some(code) = parts.get(2) {
        row = row.with_shortcode(code.trim());
    }
    Ok(row)
}
