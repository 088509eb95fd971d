//! Resource request/donation model.
//!
//! Requests and donations share one record shape and differ only by `status`.

use serde::{Deserialize, Serialize};

use super::required_text;
use crate::errors::AppError;

/// Kinds of relief supplies tracked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Food,
    Clothes,
    Shelter,
    Medicine,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Food => "food",
            ResourceType::Clothes => "clothes",
            ResourceType::Shelter => "shelter",
            ResourceType::Medicine => "medicine",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "food" => Some(ResourceType::Food),
            "clothes" => Some(ResourceType::Clothes),
            "shelter" => Some(ResourceType::Shelter),
            "medicine" => Some(ResourceType::Medicine),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// Lifecycle of a record. `Requested -> Fulfilled` is the only transition;
/// `Donated` is terminal from creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Requested,
    Donated,
    Fulfilled,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Requested => "requested",
            ResourceStatus::Donated => "donated",
            ResourceStatus::Fulfilled => "fulfilled",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "requested" => Some(ResourceStatus::Requested),
            "donated" => Some(ResourceStatus::Donated),
            "fulfilled" => Some(ResourceStatus::Fulfilled),
            _ => None,
        }
    }
}

/// A resource request or donation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    pub id: String,
    /// Requester or donor name
    pub name: String,
    pub contact_number: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub quantity: i64,
    pub priority: Priority,
    /// Camp the name resolved to when the record was written
    pub camp_id: String,
    pub camp_name: String,
    pub can_deliver_to_camp: bool,
    pub status: ResourceStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fulfilled_at: Option<String>,
}

/// Which endpoint a resource body arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Request,
    Donation,
}

/// Request body shared by `/resources/request` and `/resources/donate`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default, rename = "type")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    /// Ignored for donations
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub camp_name: Option<String>,
    #[serde(default)]
    pub can_deliver_to_camp: Option<bool>,
}

/// A validated record whose camp name still has to be resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResource {
    pub name: String,
    pub contact_number: String,
    pub resource_type: ResourceType,
    pub quantity: i64,
    pub priority: Priority,
    pub camp_name: String,
    pub can_deliver_to_camp: bool,
    pub status: ResourceStatus,
}

/// Largest quantity a single request or donation may carry.
pub const MAX_QUANTITY: i64 = i32::MAX as i64;

/// Exactly ten ASCII digits.
pub fn is_valid_contact_number(s: &str) -> bool {
    s.len() == 10 && s.bytes().all(|b| b.is_ascii_digit())
}

impl CreateResourceRequest {
    pub fn validate(self, kind: ResourceKind) -> Result<NewResource, AppError> {
        let contact_number = self.contact_number.unwrap_or_default();
        if !is_valid_contact_number(&contact_number) {
            return Err(AppError::validation("Contact number must be 10 digits"));
        }

        let quantity = match self.quantity {
            Some(q) if q > MAX_QUANTITY => {
                return Err(AppError::Validation(format!(
                    "Quantity must not exceed {}",
                    MAX_QUANTITY
                )))
            }
            Some(q) if q > 0 => q,
            _ => return Err(AppError::validation("Quantity must be greater than 0")),
        };

        let name = required_text(&self.name)
            .ok_or_else(|| AppError::validation("Name is required"))?;

        let raw_type = required_text(&self.resource_type)
            .ok_or_else(|| AppError::validation("Resource type is required"))?;
        let resource_type = ResourceType::from_str(&raw_type)
            .ok_or_else(|| AppError::Validation(format!("Invalid resource type: {}", raw_type)))?;

        let camp_name = required_text(&self.camp_name)
            .ok_or_else(|| AppError::validation("Camp name is required"))?;

        let (priority, status) = match kind {
            ResourceKind::Donation => (Priority::Low, ResourceStatus::Donated),
            ResourceKind::Request => {
                let priority = match required_text(&self.priority) {
                    Some(raw) => Priority::from_str(&raw).ok_or_else(|| {
                        AppError::Validation(format!("Invalid priority: {}", raw))
                    })?,
                    None => Priority::Medium,
                };
                (priority, ResourceStatus::Requested)
            }
        };

        Ok(NewResource {
            name,
            contact_number,
            resource_type,
            quantity,
            priority,
            camp_name,
            can_deliver_to_camp: self.can_deliver_to_camp.unwrap_or(false),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(contact: &str, quantity: i64) -> CreateResourceRequest {
        CreateResourceRequest {
            name: Some("Asha".to_string()),
            contact_number: Some(contact.to_string()),
            resource_type: Some("food".to_string()),
            quantity: Some(quantity),
            priority: Some("high".to_string()),
            camp_name: Some("Central Relief Camp".to_string()),
            can_deliver_to_camp: Some(true),
        }
    }

    #[test]
    fn test_contact_number_rules() {
        assert!(is_valid_contact_number("1234567890"));
        assert!(!is_valid_contact_number("12345"));
        assert!(!is_valid_contact_number("12345678901"));
        assert!(!is_valid_contact_number("12345abcde"));
        assert!(!is_valid_contact_number("١٢٣٤٥٦٧٨٩٠"));
    }

    #[test]
    fn test_short_contact_rejected_for_both_kinds() {
        for kind in [ResourceKind::Request, ResourceKind::Donation] {
            let err = body("12345", 5).validate(kind).unwrap_err();
            assert_eq!(err.message(), "Contact number must be 10 digits");
        }
    }

    #[test]
    fn test_quantity_must_be_positive() {
        let err = body("1234567890", 0)
            .validate(ResourceKind::Request)
            .unwrap_err();
        assert_eq!(err.message(), "Quantity must be greater than 0");
    }

    #[test]
    fn test_quantity_upper_bound() {
        assert!(body("1234567890", MAX_QUANTITY)
            .validate(ResourceKind::Donation)
            .is_ok());

        for quantity in [MAX_QUANTITY + 1, i64::MAX] {
            let err = body("1234567890", quantity)
                .validate(ResourceKind::Donation)
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
            assert_eq!(err.message(), "Quantity must not exceed 2147483647");
        }
    }

    #[test]
    fn test_donation_forces_low_priority() {
        let record = body("1234567890", 50)
            .validate(ResourceKind::Donation)
            .unwrap();
        assert_eq!(record.priority, Priority::Low);
        assert_eq!(record.status, ResourceStatus::Donated);
    }

    #[test]
    fn test_request_priority_defaults_to_medium() {
        let mut req = body("1234567890", 5);
        req.priority = None;
        let record = req.validate(ResourceKind::Request).unwrap();
        assert_eq!(record.priority, Priority::Medium);
        assert_eq!(record.status, ResourceStatus::Requested);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let mut req = body("1234567890", 5);
        req.resource_type = Some("fuel".to_string());
        assert!(req.validate(ResourceKind::Request).is_err());
    }
}
