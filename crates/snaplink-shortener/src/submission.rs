use crate::error::SubmissionError;
use crate::notifier::NotifierHandle;
use crate::registry::{LinkRegistry, NewLink};
use snaplink_core::{parse_long_url, Clock, LinkRecord, Shortcode, SnapshotStore, ValidityWindow};
use snaplink_generator::CodeGenerator;
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

pub type Result<T> = std::result::Result<T, SubmissionError>;

/// Message shown after a batch went through.
pub const SUCCESS_MESSAGE: &str = "Short URLs created successfully!";

/// One row of the submission form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionRow {
    pub url: String,
    pub validity: ValidityWindow,
    /// Blank means "generate one for me".
    pub preferred_shortcode: Option<String>,
}

impl SubmissionRow {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_validity(mut self, validity: ValidityWindow) -> Self {
        self.validity = validity;
        self
    }

    pub fn with_shortcode(mut self, code: impl Into<String>) -> Self {
        self.preferred_shortcode = Some(code.into());
        self
    }
}

/// Outcome of a successful batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReceipt {
    records: Vec<LinkRecord>,
}

impl BatchReceipt {
    /// The new records, in row order.
    pub fn records(&self) -> &[LinkRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<LinkRecord> {
        self.records
    }

    pub fn message(&self) -> &'static str {
        SUCCESS_MESSAGE
    }
}

/// Stage a batch is in; a failure in any stage is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Validating,
    Generating,
    Committing,
}

impl Display for BatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchPhase::Validating => f.write_str("validating"),
            BatchPhase::Generating => f.write_str("generating"),
            BatchPhase::Committing => f.write_str("committing"),
        }
    }
}

/// Turns form rows into committed link records.
///
/// A batch is atomic: every row is validated and assigned a code first,
/// and only then is the whole batch committed in one registry update. The
/// first failing row aborts the batch and nothing is written.
pub struct SubmissionProcessor<S, C, G> {
    registry: Arc<LinkRegistry<S, C>>,
    generator: G,
    notifier: NotifierHandle,
}

impl<S: SnapshotStore, C: Clock, G: CodeGenerator> SubmissionProcessor<S, C, G> {
    pub fn new(registry: Arc<LinkRegistry<S, C>>, generator: G, notifier: NotifierHandle) -> Self {
        Self {
            registry,
            generator,
            notifier,
        }
    }

    pub fn registry(&self) -> &Arc<LinkRegistry<S, C>> {
        &self.registry
    }

    /// Processes `rows` in order and commits them together.
    ///
    /// The registry stays locked for the whole batch, so codes checked
    /// against it cannot be taken by a concurrent mutation before commit.
    pub async fn submit_batch(&self, rows: Vec<SubmissionRow>) -> Result<BatchReceipt> {
        let mut records = self.registry.lock().await;
        let mut taken: HashSet<Shortcode> =
            records.iter().map(|r| r.shortcode().clone()).collect();
        let mut staged = Vec::with_capacity(rows.len());
        let mut announcements = Vec::with_capacity(rows.len());

        for (index, row) in rows.into_iter().enumerate() {
            let number = index + 1;
            trace!(row = number, phase = %BatchPhase::Validating, "processing row");

            if parse_long_url(&row.url).is_err() {
                debug!(row = number, url = %row.url, "rejecting batch: invalid url");
                self.notifier.error(format!("Invalid URL: {}", row.url));
                return Err(SubmissionError::InvalidUrl {
                    row: number,
                    url: row.url,
                });
            }

            let preferred = match row
                .preferred_shortcode
                .as_deref()
                .map(str::trim)
                .filter(|code| !code.is_empty())
            {
                None => None,
                Some(raw) => Some(self.check_preferred(number, raw, &taken)?),
            };

            trace!(row = number, phase = %BatchPhase::Generating, "assigning code");
            let code = match self.generator.generate(&taken, preferred.as_ref()) {
                Ok(code) => code,
                Err(source) => {
                    warn!(row = number, error = %source, "rejecting batch: no code available");
                    self.notifier.error(format!("Shortcode generation failed: {source}"));
                    return Err(SubmissionError::Generator {
                        row: number,
                        source,
                    });
                }
            };
            taken.insert(code.clone());

            announcements.push(format!("Shortened URL {} -> {}", row.url, code));
            staged.push(NewLink::new(row.url, code, row.validity));
        }

        trace!(links = staged.len(), phase = %BatchPhase::Committing, "committing batch");
        let created = self
            .registry
            .commit_locked(&mut records, staged)
            .await?;
        drop(records);

        info!(links = created.len(), "batch committed");
        for message in announcements {
            self.notifier.info(message);
        }

        Ok(BatchReceipt { records: created })
    }

    fn check_preferred(
        &self,
        row: usize,
        raw: &str,
        taken: &HashSet<Shortcode>,
    ) -> Result<Shortcode> {
        let code = match Shortcode::new(raw) {
            Ok(code) => code,
            Err(_) => {
                debug!(row, code = raw, "rejecting batch: invalid shortcode");
                self.notifier.error(format!("Invalid shortcode: {raw}"));
                return Err(SubmissionError::InvalidShortcode {
                    row,
                    code: raw.to_string(),
                });
            }
        };

        if taken.contains(&code) {
            debug!(row, code = %code, "rejecting batch: shortcode already used");
            self.notifier.error(format!("Shortcode collision: {code}"));
            return Err(SubmissionError::DuplicateShortcode {
                row,
                code: code.to_string(),
            });
        }

        Ok(code)
    }
}
