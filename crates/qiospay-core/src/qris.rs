//! Static-to-dynamic QRIS conversion
//!
//! The payload is treated as an opaque TLV string. Only three anchors
//! matter: the point-of-initiation tag right after the format indicator,
//! the `5802ID` country code, and the trailing four-digit checksum.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crc::checksum_hex;

/// Point of initiation, static form (`01` tag, length `02`, value `11`)
pub const POI_STATIC: &str = "010211";
/// Point of initiation, dynamic form
pub const POI_DYNAMIC: &str = "010212";
/// Country code data object that splits head from tail
pub const COUNTRY_CODE: &str = "5802ID";

const POI_OFFSET: usize = 6;
const AMOUNT_TAG: &str = "54";
// Tag 55 (tip or convenience indicator) with its value, then the id of the fee tag
const FEE_RUPIAH: (&str, &str) = ("550202", "56");
const FEE_PERCENTAGE: (&str, &str) = ("550203", "57");

/// Codec errors. All of them are caller configuration problems.
#[derive(Error, Debug, PartialEq)]
pub enum QrisError {
    #[error("Static QRIS payload is empty")]
    EmptyPayload,

    #[error("Payload too short to carry a checksum ({0} characters)")]
    TooShort(usize),

    #[error("Country code tag 5802ID not found in payload")]
    MissingCountryCode,

    #[error("Value for tag {tag} is {len} characters, the length prefix allows 99")]
    ValueTooLong { tag: String, len: usize },

    #[error("Transaction amount must be greater than zero")]
    ZeroAmount,

    #[error("Invalid service fee value: {0}")]
    InvalidFee(String),
}

/// Service fee flavour
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeeType {
    /// Fixed fee in rupiah (tag 56)
    Rupiah,
    /// Percentage of the amount (tag 57)
    #[default]
    #[serde(alias = "persen")]
    Percentage,
}

/// Optional convenience fee appended after the amount
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeeOptions {
    pub enabled: bool,
    #[serde(rename = "type", default)]
    pub fee_type: FeeType,
    pub value: f64,
}

impl Default for FeeOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            fee_type: FeeType::Percentage,
            value: 0.7,
        }
    }
}

impl FeeOptions {
    pub fn rupiah(value: f64) -> Self {
        Self {
            enabled: true,
            fee_type: FeeType::Rupiah,
            value,
        }
    }

    pub fn percentage(value: f64) -> Self {
        Self {
            enabled: true,
            fee_type: FeeType::Percentage,
            value,
        }
    }

    /// Fee data objects: indicator (tag 55) followed by the value tag
    pub fn encode(&self) -> Result<String, QrisError> {
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(QrisError::InvalidFee(self.value.to_string()));
        }

        let (indicator, tag) = match self.fee_type {
            FeeType::Rupiah => FEE_RUPIAH,
            FeeType::Percentage => FEE_PERCENTAGE,
        };
        Ok(format!("{}{}", indicator, encode_tag(tag, &self.value.to_string())?))
    }
}

/// `<tag><2-digit length><value>`
pub fn encode_tag(tag: &str, value: &str) -> Result<String, QrisError> {
    let len = value.len();
    if len > 99 {
        return Err(QrisError::ValueTooLong {
            tag: tag.to_string(),
            len,
        });
    }
    Ok(format!("{}{:02}{}", tag, len, value))
}

/// Converts a static payload into a dynamic one carrying `amount` (and an
/// optional fee), then recomputes the trailing checksum.
pub fn make_dynamic(
    static_payload: &str,
    amount: u64,
    fee: Option<&FeeOptions>,
) -> Result<String, QrisError> {
    let payload = static_payload.trim();
    if payload.is_empty() {
        return Err(QrisError::EmptyPayload);
    }
    if amount == 0 {
        return Err(QrisError::ZeroAmount);
    }
    if payload.len() < 4 || !payload.is_char_boundary(payload.len() - 4) {
        return Err(QrisError::TooShort(payload.len()));
    }

    // 1. Drop the old checksum
    let mut body = payload[..payload.len() - 4].to_string();

    // 2. Static -> dynamic point of initiation
    if body.get(POI_OFFSET..POI_OFFSET + POI_STATIC.len()) == Some(POI_STATIC) {
        body.replace_range(POI_OFFSET..POI_OFFSET + POI_STATIC.len(), POI_DYNAMIC);
    } else {
        log::debug!("No static point-of-initiation tag at offset {}", POI_OFFSET);
    }

    // 3. Split around the country code
    let (head, tail) = body
        .split_once(COUNTRY_CODE)
        .ok_or(QrisError::MissingCountryCode)?;

    // 4-5. Amount and fee
    let amount_tag = encode_tag(AMOUNT_TAG, &amount.to_string())?;
    let fee_tag = match fee {
        Some(options) if options.enabled => options.encode()?,
        _ => String::new(),
    };

    // 6. Reassemble
    let mut dynamic = String::with_capacity(payload.len() + amount_tag.len() + fee_tag.len() + 4);
    dynamic.push_str(head.trim());
    dynamic.push_str(&amount_tag);
    dynamic.push_str(&fee_tag);
    dynamic.push_str(COUNTRY_CODE);
    dynamic.push_str(tail.trim());

    // 7. New checksum
    let crc = checksum_hex(&dynamic);
    log::trace!("Dynamic QRIS built, {} characters, CRC {}", dynamic.len() + 4, crc);
    dynamic.push_str(&crc);

    Ok(dynamic)
}

/// Codec bound to one merchant's static payload
#[derive(Debug, Clone)]
pub struct QrisCodec {
    static_payload: String,
    fee: Option<FeeOptions>,
}

impl QrisCodec {
    pub fn new(static_payload: impl Into<String>) -> Result<Self, QrisError> {
        let static_payload = static_payload.into();
        if static_payload.trim().is_empty() {
            return Err(QrisError::EmptyPayload);
        }
        Ok(Self {
            static_payload,
            fee: None,
        })
    }

    /// Default fee applied by [`payload_for`](Self::payload_for)
    pub fn with_fee(mut self, fee: FeeOptions) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn static_payload(&self) -> &str {
        &self.static_payload
    }

    /// Dynamic payload for `amount`; without an amount the static payload
    /// is returned untouched.
    pub fn payload_for(&self, amount: Option<u64>) -> Result<String, QrisError> {
        match amount {
            Some(amount) if amount > 0 => {
                make_dynamic(&self.static_payload, amount, self.fee.as_ref())
            }
            _ => Ok(self.static_payload.clone()),
        }
    }

    /// Same as [`payload_for`](Self::payload_for) with an explicit fee
    pub fn dynamic_with_fee(&self, amount: u64, fee: &FeeOptions) -> Result<String, QrisError> {
        make_dynamic(&self.static_payload, amount, Some(fee))
    }
}
