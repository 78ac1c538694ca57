//! Supplier models and DTOs.

use chrono::{DateTime, Utc};
use masnaa_core::serde::empty_string_as_none;
use masnaa_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::SupplierId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub name_ar: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSupplierDto {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::value_types::not_blank")
    )]
    pub name: String,
    #[validate(length(max = 200))]
    pub name_ar: Option<String>,
    #[validate(length(max = 200))]
    pub contact_person: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 50))]
    pub tax_number: Option<String>,
}

/// Only supplied fields are changed.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSupplierDto {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::value_types::not_blank")
    )]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub name_ar: Option<String>,
    #[validate(length(max = 200))]
    pub contact_person: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 50))]
    pub tax_number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SupplierFilterParams {
    /// Case-insensitive match on English or Arabic name
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedSuppliersResponse {
    pub data: Vec<Supplier>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_supplier_validation() {
        let dto = CreateSupplierDto {
            name: "Delta Steel".to_string(),
            name_ar: Some("دلتا للصلب".to_string()),
            contact_person: None,
            email: Some("sales@delta.example".to_string()),
            phone: None,
            address: None,
            tax_number: None,
        };
        assert!(dto.validate().is_ok());

        let blank_name = CreateSupplierDto {
            name: "    ".to_string(),
            ..dto.clone()
        };
        assert!(blank_name.validate().is_err());

        let bad_email = CreateSupplierDto {
            email: Some("sales".to_string()),
            ..dto
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_empty_update_is_valid() {
        assert!(UpdateSupplierDto::default().validate().is_ok());

        let blank_name = UpdateSupplierDto {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(blank_name.validate().is_err());
    }
}
