//! Ordered pattern tables for gateway narratives
//!
//! Two families share one engine:
//! - `Callback`: asynchronous settlement messages (`T#... R#..., SUKSES. ... SN: ...`)
//! - `Submission`: synchronous H2H submission responses (`R#... <product> <dest> ...`)
//!
//! Within a family the first matching rule wins. Supplementary extractors
//! then run over the whole text regardless of which rule (if any) matched.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::extract::{self, Draft};
use crate::record::TransactionStatus;

/// Turns the captures of a matching rule into a provisional record
pub type Extractor = fn(&Captures<'_>) -> Draft;

/// Fills fields a structural rule could not provide
pub type Supplement = fn(&str, &mut Draft);

/// Which upstream text shape a narrative follows
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeFamily {
    Callback,
    Submission,
}

impl NarrativeFamily {
    pub fn cascade(&self) -> &'static RuleCascade {
        match self {
            NarrativeFamily::Callback => &CALLBACK,
            NarrativeFamily::Submission => &SUBMISSION,
        }
    }
}

/// A compiled pattern paired with its extractor
pub struct Rule {
    name: &'static str,
    pattern: Regex,
    extract: Extractor,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, extract: Extractor) -> Self {
        let pattern = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("rule `{}` has an invalid pattern: {}", name, e));
        Self { name, pattern, extract }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn apply(&self, text: &str) -> Option<Draft> {
        self.pattern.captures(text).map(|caps| (self.extract)(&caps))
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Outcome of running a cascade over one text
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeMatch {
    /// Name of the winning rule, `None` when nothing matched
    pub rule: Option<&'static str>,
    pub draft: Draft,
}

/// Ordered rule list plus the supplements of one family
#[derive(Debug)]
pub struct RuleCascade {
    family: NarrativeFamily,
    rules: Vec<Rule>,
    supplements: Vec<Supplement>,
}

impl RuleCascade {
    pub fn family(&self) -> NarrativeFamily {
        self.family
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// First match wins; supplements always run afterwards
    pub fn run(&self, text: &str) -> CascadeMatch {
        let mut matched = None;
        let mut draft = Draft::default();

        for rule in &self.rules {
            if let Some(found) = rule.apply(text) {
                log::trace!("{:?} narrative matched rule `{}`", self.family, rule.name);
                matched = Some(rule.name);
                draft = found;
                break;
            }
        }

        if matched.is_none() {
            log::debug!("{:?} narrative matched no rule", self.family);
        }

        for supplement in &self.supplements {
            supplement(text, &mut draft);
        }

        CascadeMatch { rule: matched, draft }
    }
}

// Balance tail shared by every rule: "Saldo [48060 - 0 =] 48.060 @<stamp>"
const TAIL: &str = r"\s+Saldo\s+(?:[\d.,]+\s*-\s*[\d.,]+\s*=\s*)?(?P<balance>[\d.,]+)\s*@\s*(?P<tail>.+)$";

static CALLBACK: Lazy<RuleCascade> = Lazy::new(|| RuleCascade {
    family: NarrativeFamily::Callback,
    rules: vec![
        Rule::new(
            "settled-with-serial",
            &format!(
                r"^(?:T#(?P<trx>\d+)\s+)?R#(?P<ref>[A-Za-z0-9_-]+),?\s+(?P<status>[^.]+\.)\s*(?P<product>.+?)\.(?P<dest>\d{{8,13}})\.\s*SN:\s*(?P<sn>.*?){}",
                TAIL
            ),
            settled_with_serial,
        ),
        Rule::new(
            "settled-with-destination",
            &format!(
                r"^(?:T#(?P<trx>\d+)\s+)?R#(?P<ref>[A-Za-z0-9_-]+),?\s+(?P<status>[^.]+\.)\s*(?P<product>.+?)\.(?P<dest>\d{{8,13}})\.?(?:\s+.*?)?{}",
                TAIL
            ),
            settled_with_destination,
        ),
        Rule::new(
            "status-only",
            &format!(
                r"^(?:T#(?P<trx>\d+)\s+)?R#(?P<ref>[A-Za-z0-9_-]+),?\s+(?P<status>.+?){}",
                TAIL
            ),
            Draft::from_captures,
        ),
    ],
    supplements: vec![
        trx_id,
        bare_ref_id,
        mobile_destination,
        serial_number,
        nominal,
    ],
});

static SUBMISSION: Lazy<RuleCascade> = Lazy::new(|| RuleCascade {
    family: NarrativeFamily::Submission,
    rules: vec![
        Rule::new(
            "rejected-price-ceiling",
            &format!(
                r"^R#(?P<ref>[A-Za-z0-9_-]+),?\s+Saldo\s+(?P<wallet>\w+)\s+(?P<amount>[\d.]+)\s+(?P<product>\S+)\.(?P<dest>\d{{8,}}),\s+(?P<status>.*?){}",
                TAIL
            ),
            rejected_price_ceiling,
        ),
        Rule::new(
            "voucher-unavailable",
            &format!(
                r"^R#(?P<ref>[A-Za-z0-9_-]+),?\s+(?P<product>[^\s,]+)\s+(?P<dest>[^\s,]+),?\s+(?P<status>(?i:gagal, voucher tidak tersedia),.*?){}",
                TAIL
            ),
            known_failure,
        ),
        Rule::new(
            "invalid-phone-number",
            &format!(
                r"^R#(?P<ref>[A-Za-z0-9_-]+),?\s+(?P<product>[^\s,]+)\s+(?P<dest>[^\s,]+),?\s+(?P<status>(?i:nomor hp tidak benar)\.?.*?){}",
                TAIL
            ),
            known_failure,
        ),
        Rule::new(
            "three-token-comma",
            &format!(
                r"^R#(?P<ref>[A-Za-z0-9_-]+),?\s+(?P<product>[^\s,]+)\s+(?P<dest>\S+),\s+(?P<status>.*?){}",
                TAIL
            ),
            Draft::from_captures,
        ),
        Rule::new(
            "three-token",
            &format!(
                r"^R#(?P<ref>[A-Za-z0-9_-]+),?\s+(?P<product>[^\s,]+)\s+(?P<dest>[^\s,]+),?\s+(?P<status>.*?){}",
                TAIL
            ),
            Draft::from_captures,
        ),
        Rule::new(
            "two-token",
            &format!(
                r"^R#(?P<ref>[A-Za-z0-9_-]+),?\s+(?P<combo>.*?),\s+(?P<status>.*?){}",
                TAIL
            ),
            two_token,
        ),
    ],
    supplements: vec![bare_ref_id],
});

static TRX_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"T#(\d+)").expect("trx id regex"));
static REF_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"R#([A-Za-z0-9_-]+)").expect("ref id regex"));
static MOBILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b((?:08|628)\d{7,12})\b").expect("mobile regex"));
// Serial text runs up to the balance tail, or to the end of the text
static SERIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"SN:\s*(.*?)(?:\s+Saldo\s|$)").expect("serial regex"));

fn settled_with_serial(caps: &Captures<'_>) -> Draft {
    let mut draft = Draft::from_captures(caps);
    let record = &mut draft.record;
    record.serial_number = caps.name("sn").and_then(|m| extract::clean_serial(m.as_str()));
    record.nominal = extract::recover_nominal(
        record.serial_number.as_deref(),
        record.product_code.as_deref(),
    );
    draft
}

fn settled_with_destination(caps: &Captures<'_>) -> Draft {
    let mut draft = Draft::from_captures(caps);
    draft.record.nominal = extract::recover_nominal(None, draft.record.product_code.as_deref());
    draft
}

fn rejected_price_ceiling(caps: &Captures<'_>) -> Draft {
    let mut draft = Draft::from_captures(caps).implying(TransactionStatus::Failed);
    draft.record.nominal = caps
        .name("amount")
        .and_then(|m| extract::strip_thousands(m.as_str()));
    draft
}

fn known_failure(caps: &Captures<'_>) -> Draft {
    Draft::from_captures(caps).implying(TransactionStatus::Failed)
}

fn two_token(caps: &Captures<'_>) -> Draft {
    let mut draft = Draft::from_captures(caps);
    let combo = caps.name("combo").map(|m| m.as_str()).unwrap_or_default();
    let (product, destination) = extract::split_product_destination(combo);
    draft.record.product_code = product;
    draft.record.destination = destination;
    draft
}

fn trx_id(text: &str, draft: &mut Draft) {
    if draft.record.trx_id.is_none() {
        draft.record.trx_id = TRX_ID.captures(text).map(|c| c[1].to_string());
    }
}

fn bare_ref_id(text: &str, draft: &mut Draft) {
    if draft.record.ref_id.is_none() {
        draft.record.ref_id = REF_ID.captures(text).map(|c| c[1].to_string());
    }
}

fn mobile_destination(text: &str, draft: &mut Draft) {
    if draft.record.destination.is_none() {
        draft.record.destination = MOBILE.captures(text).map(|c| c[1].to_string());
    }
}

fn serial_number(text: &str, draft: &mut Draft) {
    if draft.record.serial_number.is_none() {
        draft.record.serial_number = SERIAL
            .captures(text)
            .and_then(|c| extract::clean_serial(&c[1]));
    }
}

/// Runs after `serial_number` so a serial found anywhere can still carry it
fn nominal(_text: &str, draft: &mut Draft) {
    let record = &mut draft.record;
    if record.nominal.is_none() {
        record.nominal = extract::recover_nominal(
            record.serial_number.as_deref(),
            record.product_code.as_deref(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICE_CEILING: &str = "R#trx_1758979420 Saldo Dana 10.000 DANA10.085155092922, diabaikan karena Harga Voucher 10.060 lebih besar dari Harga Max anda 1.000. Saldo 71.232 @27/09/2025 20:23";

    #[test]
    fn test_tables_compile() {
        assert_eq!(NarrativeFamily::Callback.cascade().rules().len(), 3);
        assert_eq!(NarrativeFamily::Submission.cascade().rules().len(), 6);
    }

    #[test]
    fn test_price_ceiling_precedes_generic_rule() {
        let cascade = NarrativeFamily::Submission.cascade();

        // The generic shape alone would accept this text too
        let generic = cascade.rule("three-token").unwrap();
        assert!(generic.is_match(PRICE_CEILING));
        let misread = generic.apply(PRICE_CEILING).unwrap();
        assert_eq!(misread.record.product_code.as_deref(), Some("Saldo"));

        let result = cascade.run(PRICE_CEILING);
        assert_eq!(result.rule, Some("rejected-price-ceiling"));
        assert_eq!(result.draft.record.product_code.as_deref(), Some("DANA10"));
        assert_eq!(result.draft.record.destination.as_deref(), Some("085155092922"));
        assert_eq!(result.draft.record.nominal, Some(10000));
        assert_eq!(result.draft.implied, Some(TransactionStatus::Failed));
    }

    #[test]
    fn test_phone_rule_precedes_generic_rule() {
        let text = "R#trx_1759240064 DANA15 6285155092922 Nomor HP tidak benar. Saldo 88.420 @ 30/09/2025 20:47";
        let result = NarrativeFamily::Submission.cascade().run(text);
        assert_eq!(result.rule, Some("invalid-phone-number"));
        assert_eq!(result.draft.implied, Some(TransactionStatus::Failed));
    }

    #[test]
    fn test_comma_not_swallowed_into_destination() {
        let text = "R#trx_1758141872 cekd 085155092922, Mohon tunggu transaksi sedang diproses. Saldo 100.543 @ 18/09/2025 10:44";
        let result = NarrativeFamily::Submission.cascade().run(text);
        assert_eq!(result.rule, Some("three-token-comma"));
        assert_eq!(result.draft.record.destination.as_deref(), Some("085155092922"));
    }

    #[test]
    fn test_two_token_fallback() {
        // A single token before the comma cannot satisfy the three-token shapes
        let text = "R#trx_4 085155092922, Nomor belum terdaftar Saldo 1.000 @ 01/10/2025 09:00";
        let result = NarrativeFamily::Submission.cascade().run(text);
        assert_eq!(result.rule, Some("two-token"));
        assert_eq!(result.draft.record.product_code, None);
        assert_eq!(result.draft.record.destination.as_deref(), Some("085155092922"));

        let text = "R#trx_3 CEKDANA, Produk sedang gangguan Saldo 71.232 @ 27/09/2025 20:10";
        let result = NarrativeFamily::Submission.cascade().run(text);
        assert_eq!(result.rule, Some("two-token"));
        assert_eq!(result.draft.record.product_code.as_deref(), Some("CEKDANA"));
        assert_eq!(result.draft.record.destination, None);
        assert_eq!(
            result.draft.status_segment.as_deref(),
            Some("Produk sedang gangguan")
        );
    }

    #[test]
    fn test_unmatched_text_keeps_bare_ref() {
        let result = NarrativeFamily::Submission.cascade().run("Timeout R#trx_99 silakan coba lagi");
        assert_eq!(result.rule, None);
        assert_eq!(result.draft.record.ref_id.as_deref(), Some("trx_99"));
        assert_eq!(result.draft.status_segment, None);
    }

    #[test]
    fn test_callback_supplements_run_without_rule() {
        let text = "T#42 R#trx_7 diterima 081234567890";
        let result = NarrativeFamily::Callback.cascade().run(text);
        assert_eq!(result.rule, None);
        assert_eq!(result.draft.record.trx_id.as_deref(), Some("42"));
        assert_eq!(result.draft.record.ref_id.as_deref(), Some("trx_7"));
        assert_eq!(result.draft.record.destination.as_deref(), Some("081234567890"));
    }

    #[test]
    fn test_callback_failure_without_serial() {
        let text = "T#1902000 R#trx_1759300000, Maaf, GAGAL. DANA H2H-Saldo Dana 20.000.085155092922. Nomor tujuan salah. Saldo 48060 - 0 = 48.060 @01/10/2025 12:00";
        let result = NarrativeFamily::Callback.cascade().run(text);
        assert_eq!(result.rule, Some("settled-with-destination"));
        let record = &result.draft.record;
        assert_eq!(record.product_code.as_deref(), Some("DANA H2H-Saldo Dana 20.000"));
        assert_eq!(record.destination.as_deref(), Some("085155092922"));
        assert_eq!(record.nominal, Some(20000));
        assert_eq!(result.draft.status_segment.as_deref(), Some("Maaf, GAGAL."));
    }

    #[test]
    fn test_serial_outside_structural_shape() {
        // 16-digit destination does not fit the settled shapes
        let text = "T#1 R#trx_1, SUKSES. Bank.1234567890123456. SN: ABC.. Saldo 1 @01/10/2025 10:00";
        let result = NarrativeFamily::Callback.cascade().run(text);
        assert_eq!(result.rule, Some("status-only"));
        assert_eq!(result.draft.record.serial_number.as_deref(), Some("ABC."));
        assert_eq!(result.draft.record.nominal, None);

        let text = "T#2 R#trx_2, SUKSES. Emoney 20.000.1234567890123456. SN: X/25000/2025.. Saldo 1 @01/10/2025 10:00";
        let result = NarrativeFamily::Callback.cascade().run(text);
        assert_eq!(result.rule, Some("status-only"));
        assert_eq!(
            result.draft.record.serial_number.as_deref(),
            Some("X/25000/2025.")
        );
        assert_eq!(result.draft.record.nominal, Some(25000));
    }

    #[test]
    fn test_serial_without_balance_tail() {
        let result = NarrativeFamily::Callback.cascade().run("R#trx_5 SN: 998877. ");
        assert_eq!(result.rule, None);
        assert_eq!(result.draft.record.serial_number.as_deref(), Some("998877"));
    }

    #[test]
    fn test_submission_ref_stops_at_comma() {
        let text = "R#trx_1, DANA10 085155092922, GAGAL. Kode produk salah. Saldo 1.000 @ 01/10/2025 09:00";
        let result = NarrativeFamily::Submission.cascade().run(text);
        assert_eq!(result.rule, Some("three-token-comma"));
        let record = &result.draft.record;
        assert_eq!(record.ref_id.as_deref(), Some("trx_1"));
        assert_eq!(record.product_code.as_deref(), Some("DANA10"));
        assert_eq!(record.destination.as_deref(), Some("085155092922"));
    }
}
