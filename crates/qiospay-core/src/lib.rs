//! QiosPay Core - payment gateway text formats
//!
//! Pure, synchronous building blocks of the QiosPay client SDK:
//! - Interpretation of gateway narratives (callbacks and H2H submission
//!   responses) into [`TransactionRecord`]s
//! - Static-to-dynamic QRIS conversion with CRC16 recomputation
//! - QRIS payload inspection, mutation filtering, H2H request parameters
//! - PNG rendering of payloads (feature `render`)

pub mod config;
pub mod crc;
pub mod emv;
pub mod extract;
pub mod mutation;
pub mod normalize;
pub mod qris;
pub mod record;
#[cfg(feature = "render")]
pub mod render;
pub mod request;
pub mod rules;
pub mod status;

pub use config::{ConfigError, QrisConfig, SdkConfig};
pub use emv::{PayloadError, QrisPayload};
pub use mutation::{MutationFilter, MutationKind, MutationRow};
pub use normalize::normalize;
pub use qris::{make_dynamic, FeeOptions, FeeType, QrisCodec, QrisError};
pub use record::{TransactionRecord, TransactionStatus};
pub use request::{is_invalid_user, H2hRequest, RequestError};
pub use rules::NarrativeFamily;
pub use status::{ClassifierConfig, StatusClassifier};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the SDK core
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("QRIS error: {0}")]
    Qris(#[from] QrisError),

    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    #[cfg(feature = "render")]
    #[error("Render error: {0}")]
    Render(#[from] render::RenderError),
}

/// Parsed record together with the rule that produced it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedNarrative {
    pub family: NarrativeFamily,
    /// `None` when the text matched no rule
    pub rule: Option<String>,
    pub record: TransactionRecord,
}

/// Narrative interpreter facade: normalize, run the family's cascade,
/// classify the status sentence. Never fails.
#[derive(Debug, Clone, Default)]
pub struct NarrativeParser {
    classifier: StatusClassifier,
}

impl NarrativeParser {
    /// Parser with the default classifier settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClassifierConfig) -> Self {
        Self {
            classifier: StatusClassifier::new(config),
        }
    }

    pub fn parse(&self, text: &str, family: NarrativeFamily) -> TransactionRecord {
        self.parse_traced(text, family).record
    }

    /// Asynchronous settlement callback text
    pub fn parse_callback(&self, text: &str) -> TransactionRecord {
        self.parse(text, NarrativeFamily::Callback)
    }

    /// Synchronous H2H submission response
    pub fn parse_submission(&self, text: &str) -> TransactionRecord {
        self.parse(text, NarrativeFamily::Submission)
    }

    /// Same as [`parse`](Self::parse), reporting which rule matched
    pub fn parse_traced(&self, text: &str, family: NarrativeFamily) -> ParsedNarrative {
        let clean = normalize(text);
        let outcome = family.cascade().run(&clean);
        let draft = outcome.draft;

        let mut record = draft.record;
        record.status = match draft.status_segment.as_deref() {
            Some(segment) => self.classifier.classify_with_hint(segment, draft.implied),
            None => draft.implied.unwrap_or_default(),
        };
        record.raw = clean;

        log::debug!(
            "{:?} narrative -> rule {:?}, status {}",
            family,
            outcome.rule,
            record.status
        );

        ParsedNarrative {
            family,
            rule: outcome.rule.map(str::to_string),
            record,
        }
    }
}

static DEFAULT_PARSER: Lazy<NarrativeParser> = Lazy::new(NarrativeParser::new);

/// Parses `text` with the default classifier settings
pub fn parse_narrative(text: &str, family: NarrativeFamily) -> TransactionRecord {
    DEFAULT_PARSER.parse(text, family)
}

/// Dynamic QRIS payload for `amount`, optionally carrying a service fee
pub fn make_dynamic_qr(
    static_payload: &str,
    amount: u64,
    fee: Option<&FeeOptions>,
) -> Result<String, SdkError> {
    Ok(make_dynamic(static_payload, amount, fee)?)
}

/// Dynamic payload plus its rendering, the shape the QRIS service returns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DynamicQr {
    pub qris_string: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qris_image: Option<String>,
}

/// Builds the payload for `amount` from the configured static QRIS and,
/// when `module_px` is given, renders it as a PNG data URI.
pub fn create_qris(
    config: &QrisConfig,
    amount: Option<u64>,
    fee: Option<&FeeOptions>,
    module_px: Option<u32>,
) -> Result<DynamicQr, SdkError> {
    config.validate()?;

    let mut codec = QrisCodec::new(config.static_payload.as_str())?;
    if let Some(fee) = fee.or(config.fee.as_ref()) {
        codec = codec.with_fee(fee.clone());
    }
    let qris_string = codec.payload_for(amount)?;

    let qris_image = match module_px {
        #[cfg(feature = "render")]
        Some(px) => Some(render::render_data_uri(&qris_string, px)?),
        #[cfg(not(feature = "render"))]
        Some(_) => None,
        None => None,
    };

    Ok(DynamicQr {
        qris_string,
        qris_image,
    })
}
