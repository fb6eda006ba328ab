//! H2H submission request parameters

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, SdkConfig};

/// Body the gateway sends back for rejected credentials
pub const INVALID_USER_BODY: &str = "Invalid user";

#[derive(Error, Debug, PartialEq)]
pub enum RequestError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Purchase request for one product/destination pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct H2hRequest {
    pub product: String,
    #[serde(rename = "dest")]
    pub destination: String,
    #[serde(rename = "refID")]
    pub ref_id: String,
    /// Highest price the caller accepts (`harga_max`)
    #[serde(rename = "harga_max", default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
}

impl H2hRequest {
    /// The reference id is always supplied by the caller
    pub fn new(
        product: impl Into<String>,
        destination: impl Into<String>,
        ref_id: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            destination: destination.into(),
            ref_id: ref_id.into(),
            max_price: None,
        }
    }

    pub fn with_max_price(mut self, max_price: u64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        if self.product.trim().is_empty() {
            return Err(RequestError::MissingField("product"));
        }
        if self.destination.trim().is_empty() {
            return Err(RequestError::MissingField("dest"));
        }
        if self.ref_id.trim().is_empty() {
            return Err(RequestError::MissingField("refID"));
        }
        Ok(())
    }

    /// Ordered query parameters for `api/h2h/trx`
    pub fn to_query(&self, config: &SdkConfig) -> Result<Vec<(&'static str, String)>, RequestError> {
        self.validate()?;
        config.validate_member()?;

        let mut query = vec![
            ("refID", self.ref_id.trim().to_string()),
            ("memberID", config.member_id.clone()),
            ("pin", config.member_pin.clone()),
            ("password", config.member_password.clone()),
            ("product", self.product.trim().to_lowercase()),
            ("dest", self.destination.trim().to_string()),
        ];
        if let Some(max_price) = self.max_price.filter(|p| *p > 0) {
            query.push(("harga_max", max_price.to_string()));
        }
        Ok(query)
    }
}

/// True when the gateway rejected the member credentials outright
pub fn is_invalid_user(body: &str) -> bool {
    body.trim() == INVALID_USER_BODY
}
