use chrono::{Datelike, NaiveDate, Utc};
use masnaa_cache::{AppCache, hash_filters, invalidate, keys};
use masnaa_core::{AppError, Message, PaginationMeta};
use masnaa_models::{PurchaseOrderId, SupplierId, UserId, format_order_number};
use masnaa_observability::track_purchase_order_created;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, info, instrument, warn};

use super::model::{
    ClearPurchaseOrdersResponse, CreatePurchaseOrderDto, NextOrderNumberResponse,
    PaginatedPurchaseOrdersResponse, PurchaseOrder, PurchaseOrderDetail,
    PurchaseOrderFilterParams, PurchaseOrderItem, PurchaseOrderItemDto, PurchaseOrderStatus,
    PurchaseOrderSummary, UpdatePurchaseOrderDto,
};

const ORDER_COLUMNS: &str = "po.id, po.order_number, po.supplier_id, po.status, po.order_date, \
                             po.expected_date, po.notes, po.created_by, po.created_at, po.updated_at";
const ITEM_COLUMNS: &str = "id, purchase_order_id, description, quantity, unit_price";
const ORDER_NUMBER_KEY: &str = "purchase_orders_order_number_key";

/// Attempts at creating an order when the generated number collides.
const MAX_NUMBER_ATTEMPTS: u32 = 3;

fn is_order_number_conflict(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation() && db_err.constraint() == Some(ORDER_NUMBER_KEY)
    )
}

/// Increments the monthly counter and returns the next order number.
///
/// Must run in the transaction that inserts the order: the upserted row stays
/// locked until commit, so concurrent creators for the same month queue up.
async fn allocate_order_number(
    tx: &mut Transaction<'_, Postgres>,
    today: NaiveDate,
) -> Result<String, sqlx::Error> {
    let sequence: i32 = sqlx::query_scalar(
        "INSERT INTO purchase_order_sequences (year, month, last_value)
         VALUES ($1, $2, 1)
         ON CONFLICT (year, month)
         DO UPDATE SET last_value = purchase_order_sequences.last_value + 1
         RETURNING last_value",
    )
    .bind(today.year())
    .bind(today.month() as i32)
    .fetch_one(&mut **tx)
    .await?;

    Ok(format_order_number(
        today.year(),
        today.month(),
        i64::from(sequence),
    ))
}

async fn insert_items(
    tx: &mut Transaction<'_, Postgres>,
    order_id: PurchaseOrderId,
    items: &[PurchaseOrderItemDto],
) -> Result<(), sqlx::Error> {
    if items.is_empty() {
        return Ok(());
    }

    let mut builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO purchase_order_items (purchase_order_id, description, quantity, unit_price) ",
    );
    builder.push_values(items, |mut row, item| {
        row.push_bind(order_id)
            .push_bind(item.description.trim())
            .push_bind(item.quantity)
            .push_bind(item.unit_price);
    });
    builder.build().execute(&mut **tx).await?;
    Ok(())
}

fn ensure_total_fits(items: &[PurchaseOrderItemDto]) -> Result<(), AppError> {
    if PurchaseOrderItemDto::total(items).is_none() {
        return Err(AppError::unprocessable(Message::OrderTotalTooLarge));
    }
    Ok(())
}

async fn ensure_supplier_exists(db: &PgPool, supplier_id: SupplierId) -> Result<(), AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
        .bind(supplier_id)
        .fetch_one(db)
        .await?;
    if !exists {
        return Err(AppError::not_found(Message::SupplierNotFound));
    }
    Ok(())
}

/// Decides whether an update may proceed given the order's current status.
fn check_update(
    current: PurchaseOrderStatus,
    dto: &UpdatePurchaseOrderDto,
) -> Result<(), AppError> {
    let edits_content = dto.supplier_id.is_some()
        || dto.expected_date.is_some()
        || dto.notes.is_some()
        || dto.items.is_some();

    if edits_content && !current.is_editable() {
        return Err(AppError::conflict(Message::PurchaseOrderLocked));
    }

    if let Some(next) = dto.status
        && next != current
        && !current.can_transition_to(next)
    {
        return Err(AppError::conflict(Message::InvalidStatusTransition));
    }

    Ok(())
}

/// Approved and received orders are part of the stock and accounting trail.
fn is_deletable(status: PurchaseOrderStatus) -> bool {
    status.is_editable() || status == PurchaseOrderStatus::Cancelled
}

async fn lock_order(
    tx: &mut Transaction<'_, Postgres>,
    order_id: PurchaseOrderId,
) -> Result<PurchaseOrderStatus, AppError> {
    sqlx::query_scalar("SELECT status FROM purchase_orders WHERE id = $1 FOR UPDATE")
        .bind(order_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::not_found(Message::PurchaseOrderNotFound))
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, params: &'a PurchaseOrderFilterParams) {
    builder.push(" WHERE 1=1");
    if let Some(status) = params.status {
        builder.push(" AND po.status = ").push_bind(status);
    }
    if let Some(supplier_id) = params.supplier_id {
        builder.push(" AND po.supplier_id = ").push_bind(supplier_id);
    }
    if let Some(search) = params.search.as_deref() {
        builder
            .push(" AND po.order_number ILIKE ")
            .push_bind(format!("%{}%", search.trim()));
    }
}

pub struct PurchaseOrderService;

impl PurchaseOrderService {
    /// Creates an order with its items under a freshly allocated number.
    ///
    /// A collision on the order number (possible only if the counter was reset
    /// while orders remained) restarts the whole transaction, a bounded number of
    /// times.
    #[instrument(skip(db, cache, dto), fields(supplier.id = %dto.supplier_id, items = dto.items.len(), db.operation = "INSERT", db.table = "purchase_orders"))]
    pub async fn create_purchase_order(
        db: &PgPool,
        cache: &AppCache,
        dto: CreatePurchaseOrderDto,
        created_by: UserId,
    ) -> Result<PurchaseOrderDetail, AppError> {
        ensure_total_fits(&dto.items)?;
        ensure_supplier_exists(db, dto.supplier_id).await?;

        let mut attempt = 1;
        let order_id = loop {
            match Self::insert_order(db, &dto, created_by).await {
                Ok(id) => break id,
                Err(e) if is_order_number_conflict(&e) && attempt < MAX_NUMBER_ATTEMPTS => {
                    warn!(attempt, "Order number collision, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        invalidate::purchase_orders(cache).await;
        track_purchase_order_created();

        let detail = Self::get_purchase_order(db, order_id).await?;
        info!(order.id = %order_id, order.number = %detail.order.order_number, "Purchase order created");
        Ok(detail)
    }

    async fn insert_order(
        db: &PgPool,
        dto: &CreatePurchaseOrderDto,
        created_by: UserId,
    ) -> Result<PurchaseOrderId, sqlx::Error> {
        let today = Utc::now().date_naive();

        let mut tx = db.begin().await?;
        let order_number = allocate_order_number(&mut tx, today).await?;

        let order_id: PurchaseOrderId = sqlx::query_scalar(
            "INSERT INTO purchase_orders
                 (order_number, supplier_id, status, order_date, expected_date, notes, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(&order_number)
        .bind(dto.supplier_id)
        .bind(PurchaseOrderStatus::Draft)
        .bind(dto.order_date.unwrap_or(today))
        .bind(dto.expected_date)
        .bind(dto.notes.as_deref().map(str::trim))
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        insert_items(&mut tx, order_id, &dto.items).await?;
        tx.commit().await?;

        Ok(order_id)
    }

    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "purchase_orders"))]
    pub async fn get_purchase_orders(
        db: &PgPool,
        cache: &AppCache,
        params: PurchaseOrderFilterParams,
    ) -> Result<PaginatedPurchaseOrdersResponse, AppError> {
        let cache_key = keys::purchase_orders::list(&hash_filters(&params));
        if let Some(cached) = cache.get::<PaginatedPurchaseOrdersResponse>(&cache_key).await {
            debug!("Purchase order list served from cache");
            return Ok(cached);
        }

        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM purchase_orders po");
        push_filters(&mut count_query, &params);
        let total: i64 = count_query.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::new(format!(
            "SELECT {ORDER_COLUMNS}, s.name AS supplier_name,
                    COUNT(i.id) AS item_count,
                    COALESCE(SUM(i.quantity::BIGINT * i.unit_price), 0)::BIGINT AS total
             FROM purchase_orders po
             JOIN suppliers s ON s.id = po.supplier_id
             LEFT JOIN purchase_order_items i ON i.purchase_order_id = po.id"
        ));
        push_filters(&mut query, &params);
        query
            .push(" GROUP BY po.id, s.name ORDER BY po.created_at DESC, po.order_number DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let data: Vec<PurchaseOrderSummary> = query.build_query_as().fetch_all(db).await?;

        let meta = PaginationMeta::new(&params.pagination, total, data.len());
        let response = PaginatedPurchaseOrdersResponse { data, meta };

        cache.set(&cache_key, &response).await;
        Ok(response)
    }

    #[instrument(skip(db), fields(order.id = %order_id, db.operation = "SELECT", db.table = "purchase_orders"))]
    pub async fn get_purchase_order(
        db: &PgPool,
        order_id: PurchaseOrderId,
    ) -> Result<PurchaseOrderDetail, AppError> {
        #[derive(sqlx::FromRow)]
        struct OrderRow {
            #[sqlx(flatten)]
            order: PurchaseOrder,
            supplier_name: String,
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS}, s.name AS supplier_name
             FROM purchase_orders po
             JOIN suppliers s ON s.id = po.supplier_id
             WHERE po.id = $1"
        ))
        .bind(order_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(Message::PurchaseOrderNotFound))?;

        let items = sqlx::query_as::<_, PurchaseOrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM purchase_order_items
             WHERE purchase_order_id = $1
             ORDER BY created_at, id"
        ))
        .bind(order_id)
        .fetch_all(db)
        .await?;

        PurchaseOrderDetail::new(row.order, row.supplier_name, items).ok_or_else(|| {
            AppError::internal(anyhow::anyhow!("purchase order {order_id} total overflows"))
        })
    }

    /// Updates header fields, status and (replacing them) items.
    ///
    /// Content edits are only accepted while the order is draft or pending; status
    /// changes must follow the allowed transitions.
    #[instrument(skip(db, cache, dto), fields(order.id = %order_id, db.operation = "UPDATE", db.table = "purchase_orders"))]
    pub async fn update_purchase_order(
        db: &PgPool,
        cache: &AppCache,
        order_id: PurchaseOrderId,
        dto: UpdatePurchaseOrderDto,
    ) -> Result<PurchaseOrderDetail, AppError> {
        if let Some(items) = &dto.items {
            ensure_total_fits(items)?;
        }
        if let Some(supplier_id) = dto.supplier_id {
            ensure_supplier_exists(db, supplier_id).await?;
        }

        let mut tx = db.begin().await?;
        let current = lock_order(&mut tx, order_id).await?;
        check_update(current, &dto)?;

        sqlx::query(
            "UPDATE purchase_orders
             SET supplier_id = COALESCE($1, supplier_id),
                 expected_date = COALESCE($2, expected_date),
                 notes = COALESCE($3, notes),
                 status = COALESCE($4, status),
                 updated_at = NOW()
             WHERE id = $5",
        )
        .bind(dto.supplier_id)
        .bind(dto.expected_date)
        .bind(dto.notes.as_deref().map(str::trim))
        .bind(dto.status)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        if let Some(items) = &dto.items {
            sqlx::query("DELETE FROM purchase_order_items WHERE purchase_order_id = $1")
                .bind(order_id)
                .execute(&mut *tx)
                .await?;
            insert_items(&mut tx, order_id, items).await?;
        }

        tx.commit().await?;
        invalidate::purchase_orders(cache).await;

        if let Some(status) = dto.status
            && status != current
        {
            info!(from = %current, to = %status, "Purchase order status changed");
        }

        Self::get_purchase_order(db, order_id).await
    }

    #[instrument(skip(db, cache), fields(order.id = %order_id, db.operation = "DELETE", db.table = "purchase_orders"))]
    pub async fn delete_purchase_order(
        db: &PgPool,
        cache: &AppCache,
        order_id: PurchaseOrderId,
    ) -> Result<(), AppError> {
        let mut tx = db.begin().await?;
        let status = lock_order(&mut tx, order_id).await?;
        if !is_deletable(status) {
            return Err(AppError::conflict(Message::PurchaseOrderLocked));
        }

        sqlx::query("DELETE FROM purchase_orders WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        invalidate::purchase_orders(cache).await;

        info!("Purchase order deleted");
        Ok(())
    }

    /// Removes every order (items cascade) and resets the monthly counters, in one
    /// transaction.
    #[instrument(skip(db, cache), fields(db.operation = "DELETE", db.table = "purchase_orders"))]
    pub async fn clear_purchase_orders(
        db: &PgPool,
        cache: &AppCache,
    ) -> Result<ClearPurchaseOrdersResponse, AppError> {
        let mut tx = db.begin().await?;

        let deleted = sqlx::query("DELETE FROM purchase_orders")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM purchase_order_sequences")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        invalidate::purchase_orders(cache).await;

        warn!(deleted, "All purchase orders cleared");
        Ok(ClearPurchaseOrdersResponse { deleted })
    }

    /// The number the next order would get right now. Takes no lock.
    #[instrument(skip(db))]
    pub async fn next_order_number(db: &PgPool) -> Result<NextOrderNumberResponse, AppError> {
        let today = Utc::now().date_naive();

        let last: Option<i32> = sqlx::query_scalar(
            "SELECT last_value FROM purchase_order_sequences WHERE year = $1 AND month = $2",
        )
        .bind(today.year())
        .bind(today.month() as i32)
        .fetch_optional(db)
        .await?;

        let next = i64::from(last.unwrap_or(0)) + 1;
        Ok(NextOrderNumberResponse {
            order_number: format_order_number(today.year(), today.month(), next),
        })
    }
}
