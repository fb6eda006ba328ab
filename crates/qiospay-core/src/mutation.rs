//! QRIS account mutations (credit/debit history) and their filtering

use serde::{Deserialize, Serialize};

/// Direction of a mutation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MutationKind {
    #[serde(rename = "CR")]
    Credit,
    #[serde(rename = "DB")]
    Debit,
}

impl MutationKind {
    pub fn code(&self) -> &'static str {
        match self {
            MutationKind::Credit => "CR",
            MutationKind::Debit => "DB",
        }
    }
}

/// One row of the mutation listing as the gateway returns it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MutationRow {
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
    pub amount: serde_json::Value,
    /// Remaining columns, passed through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MutationRow {
    /// Amount as a number; the gateway sends both `"15000"` and `15000`
    pub fn amount_value(&self) -> Option<f64> {
        match &self.amount {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Every present criterion must match for a row to be kept
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MutationFilter {
    #[serde(rename = "type")]
    pub kind: Option<MutationKind>,
    /// Prefix of the row date, e.g. `2025-09-30`
    pub date: Option<String>,
    pub amount: Option<f64>,
}

impl MutationFilter {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.date.is_none() && self.amount.is_none()
    }

    pub fn matches(&self, row: &MutationRow) -> bool {
        if let Some(kind) = self.kind {
            if !row.kind.trim().eq_ignore_ascii_case(kind.code()) {
                return false;
            }
        }

        if let Some(date) = self.date.as_deref().filter(|d| !d.is_empty()) {
            if !row.date.starts_with(date) {
                return false;
            }
        }

        match self.amount {
            Some(amount) => row.amount_value() == Some(amount),
            None => true,
        }
    }

    pub fn apply(&self, rows: &[MutationRow]) -> Vec<MutationRow> {
        let kept: Vec<MutationRow> = rows.iter().filter(|r| self.matches(r)).cloned().collect();
        log::debug!("Mutation filter kept {} of {} rows", kept.len(), rows.len());
        kept
    }
}
