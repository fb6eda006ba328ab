//! WASM bindings for the QiosPay SDK core
//!
//! Exposes narrative parsing and dynamic QRIS generation to JavaScript

use qiospay_core::{
    ClassifierConfig, FeeOptions, MutationFilter, MutationRow, NarrativeFamily, NarrativeParser,
    QrisPayload,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
    log::info!("QiosPay WASM module initialized");
}

fn js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

/// Plain objects rather than ES `Map`s, so results survive `JSON.stringify`
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_error)
}

fn family_from(name: &str) -> Result<NarrativeFamily, JsError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "callback" => Ok(NarrativeFamily::Callback),
        "submission" => Ok(NarrativeFamily::Submission),
        other => Err(JsError::new(&format!(
            "Unknown narrative family `{}`, expected `callback` or `submission`",
            other
        ))),
    }
}

/// Whole rupiah amount from a JS number
fn amount_from(amount: f64) -> Result<u64, JsError> {
    if !amount.is_finite() || amount < 1.0 || amount.fract() != 0.0 || amount > u64::MAX as f64 {
        return Err(JsError::new(&format!(
            "Amount must be a positive whole number, got {}",
            amount
        )));
    }
    Ok(amount as u64)
}

/// JavaScript-facing narrative parser
#[wasm_bindgen]
pub struct WasmNarrativeParser {
    parser: NarrativeParser,
}

#[wasm_bindgen]
impl WasmNarrativeParser {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: NarrativeParser::new(),
        }
    }

    /// @param config - `{ unclassified_status: "PENDING" }`
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<WasmNarrativeParser, JsError> {
        let config: ClassifierConfig = serde_wasm_bindgen::from_value(config).map_err(js_error)?;
        Ok(Self {
            parser: NarrativeParser::with_config(config),
        })
    }

    /// Settlement callback text -> TransactionRecord object
    #[wasm_bindgen(js_name = parseCallback)]
    pub fn parse_callback(&self, text: &str) -> Result<JsValue, JsError> {
        to_js(&self.parser.parse_callback(text))
    }

    /// H2H submission response -> TransactionRecord object
    #[wasm_bindgen(js_name = parseSubmission)]
    pub fn parse_submission(&self, text: &str) -> Result<JsValue, JsError> {
        to_js(&self.parser.parse_submission(text))
    }

    /// Record plus the name of the rule that produced it
    #[wasm_bindgen(js_name = parseTraced)]
    pub fn parse_traced(&self, text: &str, family: &str) -> Result<JsValue, JsError> {
        to_js(&self.parser.parse_traced(text, family_from(family)?))
    }
}

impl Default for WasmNarrativeParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses with default settings; `family` is `callback` or `submission`
#[wasm_bindgen(js_name = parseNarrative)]
pub fn parse_narrative(text: &str, family: &str) -> Result<JsValue, JsError> {
    to_js(&qiospay_core::parse_narrative(text, family_from(family)?))
}

/// Dynamic QRIS string for `amount`
///
/// @param fee - optional `{ enabled, type: "rupiah" | "persen", value }`
#[wasm_bindgen(js_name = makeDynamicQr)]
pub fn make_dynamic_qr(static_payload: &str, amount: f64, fee: JsValue) -> Result<String, JsError> {
    let fee: Option<FeeOptions> = if fee.is_undefined() || fee.is_null() {
        None
    } else {
        Some(serde_wasm_bindgen::from_value(fee).map_err(js_error)?)
    };

    qiospay_core::make_dynamic_qr(static_payload, amount_from(amount)?, fee.as_ref())
        .map_err(js_error)
}

/// PNG data URI of any payload
#[wasm_bindgen(js_name = renderQr)]
pub fn render_qr(payload: &str, module_px: u32) -> Result<String, JsError> {
    qiospay_core::render::render_data_uri(payload, module_px).map_err(js_error)
}

/// Checksum-validated breakdown of a QRIS payload
#[wasm_bindgen(js_name = inspectQris)]
pub fn inspect_qris(payload: &str) -> Result<JsValue, JsError> {
    let payload = QrisPayload::parse(payload).map_err(js_error)?;
    to_js(&payload)
}

/// Keeps the mutation rows matching every given criterion
///
/// @param rows - array as returned by the mutation endpoint
/// @param filter - `{ type?: "CR" | "DB", date?: string, amount?: number }`
#[wasm_bindgen(js_name = filterMutations)]
pub fn filter_mutations(rows: JsValue, filter: JsValue) -> Result<JsValue, JsError> {
    let rows: Vec<MutationRow> = serde_wasm_bindgen::from_value(rows).map_err(js_error)?;
    let filter: MutationFilter = if filter.is_undefined() || filter.is_null() {
        MutationFilter::default()
    } else {
        serde_wasm_bindgen::from_value(filter).map_err(js_error)?
    };

    to_js(&filter.apply(&rows))
}

#[wasm_bindgen(js_name = version)]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_family_names() {
        assert!(family_from("Callback").is_ok());
        assert!(family_from(" submission ").is_ok());
        assert!(family_from("report").is_err());
    }

    #[wasm_bindgen_test]
    fn test_amount_validation() {
        assert_eq!(amount_from(15000.0).ok(), Some(15000));
        assert!(amount_from(0.0).is_err());
        assert!(amount_from(10.5).is_err());
        assert!(amount_from(f64::NAN).is_err());
    }

    #[wasm_bindgen_test]
    fn test_parse_callback_returns_object() {
        let parser = WasmNarrativeParser::new();
        let value = parser
            .parse_callback("T#1 R#trx_1, SUKSES. Pulsa 10.000.081234567890. SN: 123. Saldo 5.000 @01/10/2025 10:00")
            .unwrap();
        assert!(value.is_object());
    }

    #[wasm_bindgen_test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
