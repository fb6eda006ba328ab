//! SDK configuration values
//!
//! Loading (files, environment) is left to the host application; this
//! module only describes the shape and checks the required fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::qris::FeeOptions;
use crate::status::ClassifierConfig;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} cannot be empty.")]
    MissingField(&'static str),

    #[error("Invalid configuration JSON: {0}")]
    Json(String),
}

/// Static QRIS settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QrisConfig {
    /// Merchant's static payload as printed on the counter QR
    pub static_payload: String,
    /// Fee applied when the caller does not pass one
    pub fee: Option<FeeOptions>,
}

impl QrisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(&self.static_payload, "QRIS String")
    }
}

/// Everything the gateway services need
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SdkConfig {
    pub merchant_code: String,
    pub api_key: String,
    pub member_id: String,
    pub member_pin: String,
    pub member_password: String,
    pub qris: QrisConfig,
    pub interpreter: ClassifierConfig,
}

impl SdkConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Requirements of the QRIS services (mutations, dynamic QR)
    pub fn validate_merchant(&self) -> Result<(), ConfigError> {
        require(&self.api_key, "API Key")?;
        require(&self.merchant_code, "Merchant Code")?;
        self.qris.validate()
    }

    /// Requirements of the H2H transaction service
    pub fn validate_member(&self) -> Result<(), ConfigError> {
        require(&self.member_id, "Member Id or User Id")?;
        require(&self.member_pin, "Pin Code")?;
        require(&self.member_password, "Password")
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingField(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TransactionStatus;

    #[test]
    fn test_from_json_with_defaults() {
        let config = SdkConfig::from_json(
            r#"{
                "merchant_code": "QP001",
                "api_key": "key",
                "qris": {"static_payload": "000201010211", "fee": {"enabled": true, "type": "rupiah", "value": 500}},
                "interpreter": {"unclassified_status": "PENDING"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.merchant_code, "QP001");
        assert!(config.member_id.is_empty());
        assert_eq!(config.qris.fee, Some(FeeOptions::rupiah(500.0)));
        assert_eq!(config.interpreter.unclassified_status, TransactionStatus::Pending);
        assert!(config.validate_merchant().is_ok());
    }

    #[test]
    fn test_missing_fields() {
        let config = SdkConfig::default();
        assert_eq!(config.validate_merchant(), Err(ConfigError::MissingField("API Key")));
        assert_eq!(
            config.validate_member(),
            Err(ConfigError::MissingField("Member Id or User Id"))
        );

        let config = SdkConfig {
            api_key: "k".into(),
            merchant_code: "m".into(),
            ..Default::default()
        };
        assert_eq!(
            config.validate_merchant(),
            Err(ConfigError::MissingField("QRIS String"))
        );
        assert_eq!(
            ConfigError::MissingField("QRIS String").to_string(),
            "QRIS String cannot be empty."
        );
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(SdkConfig::from_json("{"), Err(ConfigError::Json(_))));
    }
}
