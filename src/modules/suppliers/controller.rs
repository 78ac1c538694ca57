use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use masnaa_core::{AppError, ErrorResponse};
use masnaa_models::SupplierId;

use crate::middleware::auth::{
    RequireSuppliersCreate, RequireSuppliersDelete, RequireSuppliersRead, RequireSuppliersUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{
    CreateSupplierDto, PaginatedSuppliersResponse, SetActiveDto, Supplier, SupplierFilterParams,
    UpdateSupplierDto,
};
use super::service::SupplierService;

#[utoipa::path(
    get,
    path = "/api/suppliers",
    params(SupplierFilterParams),
    responses(
        (status = 200, description = "Paginated suppliers", body = PaginatedSuppliersResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    tag = "Suppliers",
    security(("bearer_auth" = []))
)]
pub async fn get_suppliers(
    State(state): State<AppState>,
    _auth: RequireSuppliersRead,
    Query(params): Query<SupplierFilterParams>,
) -> Result<Json<PaginatedSuppliersResponse>, AppError> {
    let suppliers = SupplierService::get_suppliers(&state.db, &state.cache, params).await?;
    Ok(Json(suppliers))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    params(
        ("id" = Uuid, Path, description = "Supplier ID")
    ),
    responses(
        (status = 200, description = "Supplier details", body = Supplier),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Supplier not found", body = ErrorResponse)
    ),
    tag = "Suppliers",
    security(("bearer_auth" = []))
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    _auth: RequireSuppliersRead,
    Path(id): Path<SupplierId>,
) -> Result<Json<Supplier>, AppError> {
    let supplier = SupplierService::get_supplier(&state.db, &state.cache, id).await?;
    Ok(Json(supplier))
}

#[utoipa::path(
    post,
    path = "/api/suppliers",
    request_body = CreateSupplierDto,
    responses(
        (status = 201, description = "Supplier created", body = Supplier),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Suppliers",
    security(("bearer_auth" = []))
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    _auth: RequireSuppliersCreate,
    ValidatedJson(dto): ValidatedJson<CreateSupplierDto>,
) -> Result<(StatusCode, Json<Supplier>), AppError> {
    let supplier = SupplierService::create_supplier(&state.db, &state.cache, dto).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

#[utoipa::path(
    put,
    path = "/api/suppliers/{id}",
    params(
        ("id" = Uuid, Path, description = "Supplier ID")
    ),
    request_body = UpdateSupplierDto,
    responses(
        (status = 200, description = "Supplier updated", body = Supplier),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Supplier not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Suppliers",
    security(("bearer_auth" = []))
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    _auth: RequireSuppliersUpdate,
    Path(id): Path<SupplierId>,
    ValidatedJson(dto): ValidatedJson<UpdateSupplierDto>,
) -> Result<Json<Supplier>, AppError> {
    let supplier = SupplierService::update_supplier(&state.db, &state.cache, id, dto).await?;
    Ok(Json(supplier))
}

#[utoipa::path(
    patch,
    path = "/api/suppliers/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Supplier ID")
    ),
    request_body = SetActiveDto,
    responses(
        (status = 200, description = "Supplier activation changed", body = Supplier),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Supplier not found", body = ErrorResponse)
    ),
    tag = "Suppliers",
    security(("bearer_auth" = []))
)]
pub async fn set_supplier_active(
    State(state): State<AppState>,
    _auth: RequireSuppliersUpdate,
    Path(id): Path<SupplierId>,
    ValidatedJson(dto): ValidatedJson<SetActiveDto>,
) -> Result<Json<Supplier>, AppError> {
    let supplier =
        SupplierService::set_supplier_active(&state.db, &state.cache, id, dto.is_active).await?;
    Ok(Json(supplier))
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    params(
        ("id" = Uuid, Path, description = "Supplier ID")
    ),
    responses(
        (status = 204, description = "Supplier deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Supplier not found", body = ErrorResponse),
        (status = 409, description = "Supplier is referenced by purchase orders", body = ErrorResponse)
    ),
    tag = "Suppliers",
    security(("bearer_auth" = []))
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    _auth: RequireSuppliersDelete,
    Path(id): Path<SupplierId>,
) -> Result<StatusCode, AppError> {
    SupplierService::delete_supplier(&state.db, &state.cache, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
