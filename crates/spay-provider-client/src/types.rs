//! Domain records exchanged through the adapter contract.
//!
//! Plain data with serde derives; no behavior. Monetary amounts are kept as
//! the provider sent them (number or string) so no rounding happens in
//! transit.

use serde::{Deserialize, Serialize};

/// Monetary amount as a JSON number or a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(serde_json::Number),
    Text(String),
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Amount {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Outcome status of a card operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Completed,
    Pending,
    Failed,
    Error,
    Approved,
    Rejected,
}

/// Shopper details submitted when assigning a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopperCardData {
    pub name: String,
    pub gender: String,
    pub id_number: String,
    pub birthdate: String,
    pub phone_number: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Accepted as `ccv` too, the field name inbound clients send.
    #[serde(default, alias = "ccv", skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardBalanceResponse {
    pub balance: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardResponse {
    pub card_number_id: String,
    pub card_issuer_id: String,
    #[serde(default)]
    pub card_status: Option<String>,
    #[serde(default)]
    pub last_four_digits: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCardResponse {
    pub cards: Vec<CardResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletBalanceResponse {
    pub amount: Amount,
    pub currency: String,
    pub country: String,
}

/// One entry of an error envelope. `message` is the provider diagnostic,
/// structured when it was JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: serde_json::Value,
}

/// Result envelope of a card operation, also used for failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResponse {
    pub status: OperationStatus,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error_details: Option<Vec<ErrorDetail>>,
}

impl OperationResponse {
    pub fn with_status(status: OperationStatus) -> Self {
        Self {
            status,
            data: None,
            error_details: None,
        }
    }

    pub fn failed(details: Vec<ErrorDetail>) -> Self {
        Self {
            status: OperationStatus::Failed,
            data: None,
            error_details: Some(details),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn amount_preserves_number_or_string() {
        let n: Amount = serde_json::from_value(json!(10.5)).unwrap();
        assert_eq!(serde_json::to_value(&n).unwrap(), json!(10.5));
        let s: Amount = serde_json::from_value(json!("10.00")).unwrap();
        assert_eq!(s, Amount::from("10.00"));
        assert_eq!(s.to_string(), "10.00");
    }

    #[test]
    fn status_uses_uppercase_wire_names() {
        assert_eq!(serde_json::to_value(OperationStatus::Completed).unwrap(), json!("COMPLETED"));
        let parsed: OperationStatus = serde_json::from_value(json!("REJECTED")).unwrap();
        assert_eq!(parsed, OperationStatus::Rejected);
    }

    #[test]
    fn shopper_card_data_accepts_ccv_alias() {
        let data: ShopperCardData = serde_json::from_value(json!({
            "name": "Ana",
            "gender": "female",
            "id_number": "123",
            "birthdate": "1990-01-01",
            "phone_number": "+5511999999999",
            "email": "ana@example.com",
            "ccv": "321"
        }))
        .unwrap();
        assert_eq!(data.cvv.as_deref(), Some("321"));
        assert!(data.card_id.is_none());
        assert!(data.pin_number.is_none());
    }

    #[test]
    fn card_response_optional_fields_default() {
        let card: CardResponse =
            serde_json::from_value(json!({"card_number_id": "n-1", "card_issuer_id": "i-1"}))
                .unwrap();
        assert!(card.card_status.is_none());
        assert!(card.last_four_digits.is_none());
    }

    #[test]
    fn failed_envelope_shape() {
        let envelope = OperationResponse::failed(vec![ErrorDetail {
            code: "503".into(),
            message: json!({"error": "down"}),
        }]);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "status": "FAILED",
                "data": null,
                "error_details": [{"code": "503", "message": {"error": "down"}}]
            })
        );
    }
}
