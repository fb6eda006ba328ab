//! Reading QRIS payloads back into their data objects
//!
//! Used to inspect what the codec produced, or what a merchant configured,
//! before it is shown to a payer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crc::checksum_hex;

/// Checksum data object header, always the last object of a payload
const CHECKSUM_HEADER: &str = "6304";

#[derive(Error, Debug, PartialEq)]
pub enum PayloadError {
    #[error("Checksum mismatch: payload carries {found}, content hashes to {computed}")]
    ChecksumMismatch { computed: String, found: String },

    #[error("Payload does not end with a 6304 checksum object")]
    MissingChecksum,

    #[error("Truncated data object at offset {0}")]
    Truncated(usize),

    #[error("Mandatory tag {0} is absent")]
    MissingTag(&'static str),
}

/// One `<tag><len><value>` triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataObject<'a> {
    pub tag: &'a str,
    pub value: &'a str,
}

/// Walks the top-level data objects of `payload`
pub fn data_objects(payload: &str) -> Result<Vec<DataObject<'_>>, PayloadError> {
    let mut objects = Vec::new();
    let mut rest = payload;
    let mut offset = 0;

    while !rest.is_empty() {
        let tag = rest.get(..2).ok_or(PayloadError::Truncated(offset))?;
        let len: usize = rest
            .get(2..4)
            .and_then(|l| l.parse().ok())
            .ok_or(PayloadError::Truncated(offset))?;
        let value = rest.get(4..4 + len).ok_or(PayloadError::Truncated(offset))?;

        objects.push(DataObject { tag, value });
        rest = &rest[4 + len..];
        offset += 4 + len;
    }

    Ok(objects)
}

/// Checksum-validated view of a merchant-presented QRIS
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QrisPayload {
    pub payload: String,
    /// Tag 00
    pub format_indicator: String,
    /// Tag 01: `11` static, `12` dynamic
    pub point_of_initiation: Option<String>,
    /// Tags 02 to 51, keyed by tag
    pub merchant_account_information: BTreeMap<String, String>,
    pub merchant_category_code: Option<String>,
    pub currency: Option<String>,
    pub transaction_amount: Option<String>,
    /// Tag 55: `02` fixed fee follows in 56, `03` percentage fee in 57
    pub tip_indicator: Option<String>,
    pub convenience_fee_fixed: Option<String>,
    pub convenience_fee_percentage: Option<String>,
    pub country_code: Option<String>,
    pub merchant_name: Option<String>,
    pub merchant_city: Option<String>,
    pub postal_code: Option<String>,
    pub additional_data: Option<String>,
    pub checksum: String,
    /// Anything else (tags 64 to 99, RFU)
    pub other_tags: BTreeMap<String, String>,
}

impl QrisPayload {
    pub fn parse(payload: &str) -> Result<Self, PayloadError> {
        let payload = payload.trim();
        verify_checksum(payload)?;

        let mut tags: BTreeMap<String, String> = data_objects(payload)?
            .into_iter()
            .map(|obj| (obj.tag.to_string(), obj.value.to_string()))
            .collect();

        let format_indicator = tags.remove("00").ok_or(PayloadError::MissingTag("00"))?;
        let checksum = tags.remove("63").ok_or(PayloadError::MissingChecksum)?;

        let (merchant_account_information, mut tags): (BTreeMap<_, _>, BTreeMap<_, _>) = tags
            .into_iter()
            .partition(|(tag, _)| matches!(tag.parse::<u8>(), Ok(2..=51)));

        let mut take = |tag: &str| tags.remove(tag);
        let parsed = QrisPayload {
            payload: payload.to_string(),
            format_indicator,
            point_of_initiation: take("01"),
            merchant_account_information,
            merchant_category_code: take("52"),
            currency: take("53"),
            transaction_amount: take("54"),
            tip_indicator: take("55"),
            convenience_fee_fixed: take("56"),
            convenience_fee_percentage: take("57"),
            country_code: take("58"),
            merchant_name: take("59"),
            merchant_city: take("60"),
            postal_code: take("61"),
            additional_data: take("62"),
            checksum,
            other_tags: BTreeMap::new(),
        };

        Ok(QrisPayload {
            other_tags: tags,
            ..parsed
        })
    }

    pub fn is_dynamic(&self) -> bool {
        self.point_of_initiation.as_deref() == Some("12")
    }

    /// Tag 54 as whole rupiah
    pub fn amount(&self) -> Option<u64> {
        self.transaction_amount.as_deref().and_then(|a| a.parse().ok())
    }
}

fn verify_checksum(payload: &str) -> Result<(), PayloadError> {
    let split = payload
        .len()
        .checked_sub(4)
        .filter(|&at| payload.is_char_boundary(at))
        .ok_or(PayloadError::MissingChecksum)?;
    let (content, found) = payload.split_at(split);

    if !content.ends_with(CHECKSUM_HEADER) {
        return Err(PayloadError::MissingChecksum);
    }

    let computed = checksum_hex(content);
    if !found.eq_ignore_ascii_case(&computed) {
        return Err(PayloadError::ChecksumMismatch {
            computed,
            found: found.to_string(),
        });
    }
    Ok(())
}
