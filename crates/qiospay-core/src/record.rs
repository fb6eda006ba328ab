//! Structured view of a gateway narrative

use serde::{Deserialize, Serialize};

/// Coarse transaction outcome
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    #[serde(rename = "SUKSES")]
    Success,
    #[serde(rename = "GAGAL")]
    Failed,
    Pending,
    #[default]
    Unknown,
}

impl TransactionStatus {
    /// Provider spelling of the status (`SUKSES`, `GAGAL`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "SUKSES",
            TransactionStatus::Failed => "GAGAL",
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of interpreting one narrative.
///
/// Every optional field stays `None` unless a rule produced it, so an
/// absent value never collapses into an empty string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TransactionRecord {
    /// Gateway id (`T#` prefix in the text)
    pub trx_id: Option<String>,
    /// Caller reference (`R#` prefix in the text)
    pub ref_id: Option<String>,
    pub status: TransactionStatus,
    /// Status sentence the outcome was derived from
    pub status_message: Option<String>,
    /// Phone or account number
    pub destination: Option<String>,
    pub product_code: Option<String>,
    pub serial_number: Option<String>,
    /// Amount in minor units
    pub nominal: Option<u64>,
    /// Balance as the provider formatted it (`48.060`, `73345`)
    pub balance: Option<String>,
    /// Literal `dd/mm/yyyy HH:MM`
    pub timestamp: Option<String>,
    pub note: Option<String>,
    /// Normalized input
    pub raw: String,
}

impl TransactionRecord {
    /// Record carrying only the normalized text
    pub fn bare(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            ..Default::default()
        }
    }

    /// True when no rule contributed anything beyond `raw`
    pub fn is_bare(&self) -> bool {
        *self == Self::bare(self.raw.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_uses_provider_words() {
        let json = serde_json::to_string(&TransactionStatus::Success).unwrap();
        assert_eq!(json, "\"SUKSES\"");

        let parsed: TransactionStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(parsed, TransactionStatus::Pending);
        assert_eq!(TransactionStatus::Failed.to_string(), "GAGAL");
    }

    #[test]
    fn test_bare_record() {
        let record = TransactionRecord::bare("hello");
        assert!(record.is_bare());
        assert_eq!(record.status, TransactionStatus::Unknown);

        let mut with_ref = record.clone();
        with_ref.ref_id = Some("trx_1".to_string());
        assert!(!with_ref.is_bare());
    }
}
