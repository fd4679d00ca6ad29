//! Discount code records.

use serde::{Deserialize, Serialize};

use super::lenient_f64;

/// Lifecycle state of a discount code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountStatus {
    Active,
    Inactive,
    Expired,
}

/// A discount code attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountCode {
    pub id: u64,
    pub code: String,
    #[serde(default)]
    pub event: Option<u64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub discount_value: Option<f64>,
    #[serde(default)]
    pub max_uses: Option<u64>,
    #[serde(default)]
    pub usage_count: Option<u64>,
    #[serde(default)]
    pub used_count: Option<u64>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(default)]
    pub status: Option<DiscountStatus>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl DiscountCode {
    /// Discount amount, whichever field the endpoint used.
    pub fn value(&self) -> Option<f64> {
        self.amount.or(self.discount_value)
    }

    /// Number of redemptions so far.
    pub fn uses(&self) -> u64 {
        self.usage_count.or(self.used_count).unwrap_or(0)
    }

    /// Expiry date as sent by the backend.
    pub fn expiry(&self) -> Option<&str> {
        self.expires_at.as_deref().or(self.valid_until.as_deref())
    }
}

/// Body for creating a discount code.
#[derive(Debug, Clone, Serialize)]
pub struct DiscountCodePayload {
    pub event: u64,
    pub code: String,
    pub amount: f64,
    pub max_uses: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_user_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Partial update of a discount code.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscountCodeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_user_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_alternate_field_names() {
        let code: DiscountCode = serde_json::from_value(json!({
            "id": 9,
            "code": "EARLY10",
            "discount_value": "10.50",
            "used_count": 4,
            "valid_until": "2026-12-01",
            "status": "active"
        }))
        .unwrap();

        assert_eq!(code.value(), Some(10.5));
        assert_eq!(code.uses(), 4);
        assert_eq!(code.expiry(), Some("2026-12-01"));
        assert_eq!(code.status, Some(DiscountStatus::Active));
    }

    #[test]
    fn update_omits_unset_fields() {
        let update = DiscountCodeUpdate {
            max_uses: Some(50),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"max_uses": 50}));
    }
}
