//! Field extraction helpers shared by both rule families

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::record::{TransactionRecord, TransactionStatus};

static STAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}/\d{2}/\d{4}\s+\d{2}:\d{2})(.*)$").expect("stamp regex")
});
static SERIAL_NOMINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(\d{4,7})/").expect("serial nominal regex"));
static GROUPED_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,3}(?:\.\d{3})+)").expect("grouped number regex"));

/// Provisional record produced by a matching rule, before classification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub record: TransactionRecord,
    /// Sentence handed to the status classifier
    pub status_segment: Option<String>,
    /// Outcome implied by the rule shape itself
    pub implied: Option<TransactionStatus>,
}

impl Draft {
    /// Reads the named groups every rule shares: `trx`, `ref`, `product`,
    /// `dest`, `status`, `balance`, `tail` (timestamp plus note).
    pub fn from_captures(caps: &Captures<'_>) -> Self {
        let mut record = TransactionRecord {
            trx_id: group(caps, "trx"),
            ref_id: group(caps, "ref"),
            product_code: group(caps, "product"),
            destination: group(caps, "dest"),
            balance: group(caps, "balance"),
            ..Default::default()
        };

        if let Some(tail) = group(caps, "tail") {
            let (timestamp, note) = split_stamp(&tail);
            record.timestamp = Some(timestamp);
            record.note = note;
        }

        let status_segment = group(caps, "status");
        record.status_message = status_segment.clone();

        Self {
            record,
            status_segment,
            implied: None,
        }
    }

    pub fn implying(mut self, status: TransactionStatus) -> Self {
        self.implied = Some(status);
        self
    }
}

/// Trimmed, non-empty named group
pub fn group(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Splits the text after `@` into the literal timestamp and a trailing note.
/// A tail that does not start with `dd/mm/yyyy HH:MM` is kept whole.
pub fn split_stamp(tail: &str) -> (String, Option<String>) {
    let tail = tail.trim();
    match STAMP.captures(tail) {
        Some(caps) => {
            let note = caps[2].trim();
            let note = (!note.is_empty()).then(|| note.to_string());
            (caps[1].to_string(), note)
        }
        None => (tail.to_string(), None),
    }
}

/// Splits `"<product words> <destination>"` when the last token carries a
/// digit; otherwise the whole segment is the product.
pub fn split_product_destination(segment: &str) -> (Option<String>, Option<String>) {
    let segment = segment.trim();
    if segment.is_empty() {
        return (None, None);
    }

    let tokens: Vec<&str> = segment.split_whitespace().collect();
    match tokens.split_last() {
        Some((last, rest)) if last.chars().any(|c| c.is_ascii_digit()) => {
            let product = rest.join(" ");
            let product = (!product.is_empty()).then_some(product);
            (product, Some(last.to_string()))
        }
        _ => (Some(segment.to_string()), None),
    }
}

/// Serial number text between `SN:` and the balance tail.
///
/// Everything from the first `..` on is dropped and a single period is put
/// back; without a double period, trailing periods and spaces are stripped.
pub fn clean_serial(segment: &str) -> Option<String> {
    let serial = match segment.find("..") {
        Some(idx) => format!("{}.", segment[..idx].trim()),
        None => segment
            .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
            .trim()
            .to_string(),
    };

    (!serial.is_empty() && serial != ".").then_some(serial)
}

/// `"15.000"` -> `15000`
pub fn strip_thousands(token: &str) -> Option<u64> {
    token.replace('.', "").parse().ok()
}

/// Nominal from a `/nnnn/` token inside the serial, falling back to a
/// dot-grouped number inside the product name.
pub fn recover_nominal(serial: Option<&str>, product: Option<&str>) -> Option<u64> {
    if let Some(caps) = serial.and_then(|sn| SERIAL_NOMINAL.captures(sn)) {
        return caps[1].parse().ok();
    }

    product
        .and_then(|p| GROUPED_NUMBER.captures(p))
        .and_then(|caps| strip_thousands(&caps[1]))
}
