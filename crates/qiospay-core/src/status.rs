//! Three-way outcome classification of a status sentence

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::record::TransactionStatus;

static STATUS_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(SUKSES|GAGAL|PENDING)\b").expect("status regex"));

/// Classifier settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierConfig {
    /// Outcome reported when the sentence carries none of the literal words
    /// and the matching rule implies nothing either.
    ///
    /// Provider samples disagree here ("sedang diproses" was expected to
    /// read as success, "masih dalam proses" as failure), so the default
    /// stays `Unknown` until callers decide otherwise.
    pub unclassified_status: TransactionStatus,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            unclassified_status: TransactionStatus::Unknown,
        }
    }
}

/// Maps free-text status segments to [`TransactionStatus`]
#[derive(Debug, Clone, Default)]
pub struct StatusClassifier {
    config: ClassifierConfig,
}

impl StatusClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// First literal wins; otherwise the configured default
    pub fn classify(&self, segment: &str) -> TransactionStatus {
        self.classify_with_hint(segment, None)
    }

    /// Like [`classify`](Self::classify), but a rule-implied outcome takes
    /// precedence over the configured default.
    pub fn classify_with_hint(
        &self,
        segment: &str,
        implied: Option<TransactionStatus>,
    ) -> TransactionStatus {
        match literal_status(segment) {
            Some(status) => status,
            None => implied.unwrap_or(self.config.unclassified_status),
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }
}

/// Leftmost whole-word `SUKSES`/`GAGAL`/`PENDING`, case-insensitive
pub fn literal_status(segment: &str) -> Option<TransactionStatus> {
    let caps = STATUS_WORD.captures(segment)?;
    match caps[1].to_ascii_uppercase().as_str() {
        "SUKSES" => Some(TransactionStatus::Success),
        "GAGAL" => Some(TransactionStatus::Failed),
        "PENDING" => Some(TransactionStatus::Pending),
        _ => None,
    }
}
