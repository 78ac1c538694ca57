use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use masnaa_core::{AppError, ErrorResponse};
use masnaa_models::PurchaseOrderId;

use crate::middleware::auth::{
    RequirePurchaseOrdersCreate, RequirePurchaseOrdersDelete, RequirePurchaseOrdersRead,
    RequirePurchaseOrdersUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{
    ClearPurchaseOrdersResponse, CreatePurchaseOrderDto, NextOrderNumberResponse,
    PaginatedPurchaseOrdersResponse, PurchaseOrderDetail, PurchaseOrderFilterParams,
    UpdatePurchaseOrderDto,
};
use super::service::PurchaseOrderService;

#[utoipa::path(
    get,
    path = "/api/purchase-orders",
    params(PurchaseOrderFilterParams),
    responses(
        (status = 200, description = "Paginated purchase orders with supplier name and total", body = PaginatedPurchaseOrdersResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    tag = "Purchase Orders",
    security(("bearer_auth" = []))
)]
pub async fn get_purchase_orders(
    State(state): State<AppState>,
    _auth: RequirePurchaseOrdersRead,
    Query(params): Query<PurchaseOrderFilterParams>,
) -> Result<Json<PaginatedPurchaseOrdersResponse>, AppError> {
    let orders = PurchaseOrderService::get_purchase_orders(&state.db, &state.cache, params).await?;
    Ok(Json(orders))
}

/// Preview of the next order number. Advisory only.
#[utoipa::path(
    get,
    path = "/api/purchase-orders/next-number",
    responses(
        (status = 200, description = "Number the next order would receive", body = NextOrderNumberResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    tag = "Purchase Orders",
    security(("bearer_auth" = []))
)]
pub async fn next_order_number(
    State(state): State<AppState>,
    _auth: RequirePurchaseOrdersCreate,
) -> Result<Json<NextOrderNumberResponse>, AppError> {
    let next = PurchaseOrderService::next_order_number(&state.db).await?;
    Ok(Json(next))
}

#[utoipa::path(
    get,
    path = "/api/purchase-orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 200, description = "Purchase order with items", body = PurchaseOrderDetail),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Purchase order not found", body = ErrorResponse)
    ),
    tag = "Purchase Orders",
    security(("bearer_auth" = []))
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    _auth: RequirePurchaseOrdersRead,
    Path(id): Path<PurchaseOrderId>,
) -> Result<Json<PurchaseOrderDetail>, AppError> {
    let order = PurchaseOrderService::get_purchase_order(&state.db, id).await?;
    Ok(Json(order))
}

#[utoipa::path(
    post,
    path = "/api/purchase-orders",
    request_body = CreatePurchaseOrderDto,
    responses(
        (status = 201, description = "Purchase order created", body = PurchaseOrderDetail),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Supplier not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Purchase Orders",
    security(("bearer_auth" = []))
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    RequirePurchaseOrdersCreate(auth_user): RequirePurchaseOrdersCreate,
    ValidatedJson(dto): ValidatedJson<CreatePurchaseOrderDto>,
) -> Result<(StatusCode, Json<PurchaseOrderDetail>), AppError> {
    let order = PurchaseOrderService::create_purchase_order(
        &state.db,
        &state.cache,
        dto,
        auth_user.user_id(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    put,
    path = "/api/purchase-orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    request_body = UpdatePurchaseOrderDto,
    responses(
        (status = 200, description = "Purchase order updated", body = PurchaseOrderDetail),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Purchase order or supplier not found", body = ErrorResponse),
        (status = 409, description = "Order locked or status change not allowed", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Purchase Orders",
    security(("bearer_auth" = []))
)]
pub async fn update_purchase_order(
    State(state): State<AppState>,
    _auth: RequirePurchaseOrdersUpdate,
    Path(id): Path<PurchaseOrderId>,
    ValidatedJson(dto): ValidatedJson<UpdatePurchaseOrderDto>,
) -> Result<Json<PurchaseOrderDetail>, AppError> {
    let order =
        PurchaseOrderService::update_purchase_order(&state.db, &state.cache, id, dto).await?;
    Ok(Json(order))
}

#[utoipa::path(
    delete,
    path = "/api/purchase-orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID")
    ),
    responses(
        (status = 204, description = "Purchase order deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Purchase order not found", body = ErrorResponse),
        (status = 409, description = "Approved or received orders cannot be deleted", body = ErrorResponse)
    ),
    tag = "Purchase Orders",
    security(("bearer_auth" = []))
)]
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    _auth: RequirePurchaseOrdersDelete,
    Path(id): Path<PurchaseOrderId>,
) -> Result<StatusCode, AppError> {
    PurchaseOrderService::delete_purchase_order(&state.db, &state.cache, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete every purchase order and reset numbering
#[utoipa::path(
    delete,
    path = "/api/purchase-orders",
    responses(
        (status = 200, description = "All purchase orders deleted", body = ClearPurchaseOrdersResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    tag = "Purchase Orders",
    security(("bearer_auth" = []))
)]
pub async fn clear_purchase_orders(
    State(state): State<AppState>,
    _auth: RequirePurchaseOrdersDelete,
) -> Result<Json<ClearPurchaseOrdersResponse>, AppError> {
    let result = PurchaseOrderService::clear_purchase_orders(&state.db, &state.cache).await?;
    Ok(Json(result))
}
