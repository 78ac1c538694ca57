//! Purchase order models, DTOs and order-number formatting.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use masnaa_core::serde::empty_string_as_none;
use masnaa_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgTypeInfo, PgValueRef};
use sqlx::{Database, Decode, Encode, FromRow, Postgres, Type};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{PurchaseOrderId, PurchaseOrderItemId, SupplierId, UserId};

pub const ORDER_NUMBER_PREFIX: &str = "PO";

pub const MAX_ITEM_QUANTITY: i32 = 1_000_000;
/// Minor currency units.
pub const MAX_UNIT_PRICE: i64 = 10_000_000_000;
pub const MAX_ORDER_ITEMS: u64 = 500;

/// `PO-{year}-{month:02}-{sequence:04}`. Sequences above 9999 widen rather than wrap.
pub fn format_order_number(year: i32, month: u32, sequence: i64) -> String {
    format!("{ORDER_NUMBER_PREFIX}-{year}-{month:02}-{sequence:04}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseOrderStatus {
    Draft,
    Pending,
    Approved,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Received => "received",
            Self::Cancelled => "cancelled",
        }
    }

    /// Header fields and items may only change before approval.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Pending)
    }

    pub fn can_transition_to(&self, next: Self) -> bool {
        use PurchaseOrderStatus::*;
        matches!(
            (self, next),
            (Draft, Pending)
                | (Draft, Cancelled)
                | (Pending, Draft)
                | (Pending, Approved)
                | (Pending, Cancelled)
                | (Approved, Received)
                | (Approved, Cancelled)
        )
    }
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseOrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "received" => Ok(Self::Received),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown purchase order status: {other}")),
        }
    }
}

// Stored as TEXT guarded by a CHECK constraint.
impl Type<Postgres> for PurchaseOrderStatus {
    fn type_info() -> PgTypeInfo {
        <&str as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <&str as Type<Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Postgres> for PurchaseOrderStatus {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as Encode<'q, Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> Decode<'r, Postgres> for PurchaseOrderStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as Decode<'r, Postgres>>::decode(value)?;
        Ok(raw.parse()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    #[schema(example = "PO-2025-06-0001")]
    pub order_number: String,
    pub supplier_id: SupplierId,
    pub status: PurchaseOrderStatus,
    pub order_date: NaiveDate,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PurchaseOrderItem {
    pub id: PurchaseOrderItemId,
    pub purchase_order_id: PurchaseOrderId,
    pub description: String,
    pub quantity: i32,
    /// Minor currency units.
    pub unit_price: i64,
}

impl PurchaseOrderItem {
    pub fn line_total(&self) -> Option<i64> {
        line_total(self.quantity, self.unit_price)
    }
}

fn line_total(quantity: i32, unit_price: i64) -> Option<i64> {
    i64::from(quantity).checked_mul(unit_price)
}

/// Sum of `quantity * unit_price`, or `None` when it does not fit in an `i64`.
pub fn order_total<I>(lines: I) -> Option<i64>
where
    I: IntoIterator<Item = (i32, i64)>,
{
    lines
        .into_iter()
        .try_fold(0i64, |total, (quantity, unit_price)| {
            total.checked_add(line_total(quantity, unit_price)?)
        })
}

/// List row: the order header with its supplier name and derived total.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PurchaseOrderSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub supplier_name: String,
    pub item_count: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseOrderDetail {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub supplier_name: String,
    pub items: Vec<PurchaseOrderItem>,
    pub total: i64,
}

impl PurchaseOrderDetail {
    /// `None` when the items' total overflows.
    pub fn new(
        order: PurchaseOrder,
        supplier_name: String,
        items: Vec<PurchaseOrderItem>,
    ) -> Option<Self> {
        let total = order_total(items.iter().map(|i| (i.quantity, i.unit_price)))?;
        Some(Self {
            order,
            supplier_name,
            items,
            total,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PurchaseOrderItemDto {
    #[validate(
        length(min = 1, max = 500),
        custom(function = "crate::value_types::not_blank")
    )]
    pub description: String,
    #[validate(range(min = 1, max = MAX_ITEM_QUANTITY))]
    pub quantity: i32,
    #[validate(range(min = 0, max = MAX_UNIT_PRICE))]
    pub unit_price: i64,
}

impl PurchaseOrderItemDto {
    pub fn total(items: &[Self]) -> Option<i64> {
        order_total(items.iter().map(|i| (i.quantity, i.unit_price)))
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderDto {
    pub supplier_id: SupplierId,
    /// Defaults to today.
    pub order_date: Option<NaiveDate>,
    pub expected_date: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(
        length(min = 1, max = MAX_ORDER_ITEMS, message = "Between 1 and 500 items are required"),
        nested
    )]
    pub items: Vec<PurchaseOrderItemDto>,
}

/// Items, when present, replace the existing lines.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseOrderDto {
    pub supplier_id: Option<SupplierId>,
    pub expected_date: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub status: Option<PurchaseOrderStatus>,
    #[validate(
        length(min = 1, max = MAX_ORDER_ITEMS, message = "Between 1 and 500 items are required"),
        nested
    )]
    pub items: Option<Vec<PurchaseOrderItemDto>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PurchaseOrderFilterParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<String>)]
    pub status: Option<PurchaseOrderStatus>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<String>)]
    pub supplier_id: Option<SupplierId>,
    /// Match on order number
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedPurchaseOrdersResponse {
    pub data: Vec<PurchaseOrderSummary>,
    pub meta: PaginationMeta,
}

/// Advisory: a concurrent create may take this number first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NextOrderNumberResponse {
    pub order_number: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClearPurchaseOrdersResponse {
    pub deleted: u64,
}
