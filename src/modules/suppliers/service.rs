use masnaa_cache::{AppCache, hash_filters, invalidate, keys};
use masnaa_core::{AppError, Message, PaginationMeta};
use masnaa_models::SupplierId;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, instrument};

use super::model::{
    CreateSupplierDto, PaginatedSuppliersResponse, Supplier, SupplierFilterParams,
    UpdateSupplierDto,
};

const SUPPLIER_COLUMNS: &str = "id, name, name_ar, contact_person, email, phone, address, \
                                tax_number, is_active, created_at, updated_at";

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn map_in_use(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_foreign_key_violation()
    {
        return AppError::conflict(Message::SupplierInUse);
    }
    AppError::from(e)
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, params: &'a SupplierFilterParams) {
    builder.push(" WHERE 1=1");
    if let Some(is_active) = params.is_active {
        builder.push(" AND is_active = ").push_bind(is_active);
    }
    if let Some(search) = params.search.as_deref() {
        let pattern = format!("%{}%", search.trim());
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR name_ar ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

pub struct SupplierService;

impl SupplierService {
    #[instrument(skip(db, cache, dto), fields(supplier.name = %dto.name, db.operation = "INSERT", db.table = "suppliers"))]
    pub async fn create_supplier(
        db: &PgPool,
        cache: &AppCache,
        dto: CreateSupplierDto,
    ) -> Result<Supplier, AppError> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "INSERT INTO suppliers (name, name_ar, contact_person, email, phone, address, tax_number)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {SUPPLIER_COLUMNS}"
        ))
        .bind(dto.name.trim())
        .bind(trimmed(dto.name_ar.as_deref()))
        .bind(trimmed(dto.contact_person.as_deref()))
        .bind(trimmed(dto.email.as_deref()).map(str::to_lowercase))
        .bind(trimmed(dto.phone.as_deref()))
        .bind(trimmed(dto.address.as_deref()))
        .bind(trimmed(dto.tax_number.as_deref()))
        .fetch_one(db)
        .await?;

        invalidate::supplier(cache).await;

        info!(supplier.id = %supplier.id, "Supplier created");
        Ok(supplier)
    }

    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "suppliers"))]
    pub async fn get_suppliers(
        db: &PgPool,
        cache: &AppCache,
        params: SupplierFilterParams,
    ) -> Result<PaginatedSuppliersResponse, AppError> {
        let cache_key = keys::suppliers::list(&hash_filters(&params));
        if let Some(cached) = cache.get::<PaginatedSuppliersResponse>(&cache_key).await {
            debug!("Supplier list served from cache");
            return Ok(cached);
        }

        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM suppliers");
        push_filters(&mut count_query, &params);
        let total: i64 = count_query.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::new(format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers"));
        push_filters(&mut query, &params);
        query
            .push(" ORDER BY name, id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let data: Vec<Supplier> = query.build_query_as().fetch_all(db).await?;

        let meta = PaginationMeta::new(&params.pagination, total, data.len());
        let response = PaginatedSuppliersResponse { data, meta };

        cache.set(&cache_key, &response).await;
        Ok(response)
    }

    #[instrument(skip(db, cache), fields(supplier.id = %supplier_id, db.operation = "SELECT", db.table = "suppliers"))]
    pub async fn get_supplier(
        db: &PgPool,
        cache: &AppCache,
        supplier_id: SupplierId,
    ) -> Result<Supplier, AppError> {
        let cache_key = keys::suppliers::by_id(supplier_id.into_inner());
        if let Some(supplier) = cache.get::<Supplier>(&cache_key).await {
            debug!("Supplier found in cache");
            return Ok(supplier);
        }

        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1"
        ))
        .bind(supplier_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(Message::SupplierNotFound))?;

        cache.set(&cache_key, &supplier).await;
        Ok(supplier)
    }

    #[instrument(skip(db, cache, dto), fields(supplier.id = %supplier_id, db.operation = "UPDATE", db.table = "suppliers"))]
    pub async fn update_supplier(
        db: &PgPool,
        cache: &AppCache,
        supplier_id: SupplierId,
        dto: UpdateSupplierDto,
    ) -> Result<Supplier, AppError> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "UPDATE suppliers
             SET name = COALESCE($1, name),
                 name_ar = COALESCE($2, name_ar),
                 contact_person = COALESCE($3, contact_person),
                 email = COALESCE($4, email),
                 phone = COALESCE($5, phone),
                 address = COALESCE($6, address),
                 tax_number = COALESCE($7, tax_number),
                 updated_at = NOW()
             WHERE id = $8
             RETURNING {SUPPLIER_COLUMNS}"
        ))
        .bind(trimmed(dto.name.as_deref()))
        .bind(trimmed(dto.name_ar.as_deref()))
        .bind(trimmed(dto.contact_person.as_deref()))
        .bind(trimmed(dto.email.as_deref()).map(str::to_lowercase))
        .bind(trimmed(dto.phone.as_deref()))
        .bind(trimmed(dto.address.as_deref()))
        .bind(trimmed(dto.tax_number.as_deref()))
        .bind(supplier_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(Message::SupplierNotFound))?;

        invalidate::supplier(cache).await;
        Ok(supplier)
    }

    /// Inactive suppliers stay readable and keep their orders.
    #[instrument(skip(db, cache), fields(supplier.id = %supplier_id, db.operation = "UPDATE", db.table = "suppliers"))]
    pub async fn set_supplier_active(
        db: &PgPool,
        cache: &AppCache,
        supplier_id: SupplierId,
        is_active: bool,
    ) -> Result<Supplier, AppError> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "UPDATE suppliers SET is_active = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING {SUPPLIER_COLUMNS}"
        ))
        .bind(is_active)
        .bind(supplier_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(Message::SupplierNotFound))?;

        invalidate::supplier(cache).await;

        info!(is_active, "Supplier activation changed");
        Ok(supplier)
    }

    /// Suppliers referenced by purchase orders cannot be deleted; deactivate them
    /// instead.
    #[instrument(skip(db, cache), fields(supplier.id = %supplier_id, db.operation = "DELETE", db.table = "suppliers"))]
    pub async fn delete_supplier(
        db: &PgPool,
        cache: &AppCache,
        supplier_id: SupplierId,
    ) -> Result<(), AppError> {
        let deleted = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(supplier_id)
            .execute(db)
            .await
            .map_err(map_in_use)?
            .rows_affected();

        if deleted == 0 {
            return Err(AppError::not_found(Message::SupplierNotFound));
        }

        invalidate::supplier(cache).await;

        info!("Supplier deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed_drops_blank_values() {
        assert_eq!(trimmed(Some("  Delta  ")), Some("Delta"));
        assert_eq!(trimmed(Some("   ")), None);
        assert_eq!(trimmed(None), None);
    }

    #[test]
    fn test_filters_change_cache_key() {
        let all = SupplierFilterParams::default();
        let active = SupplierFilterParams {
            is_active: Some(true),
            ..Default::default()
        };
        assert_ne!(
            keys::suppliers::list(&hash_filters(&all)),
            keys::suppliers::list(&hash_filters(&active))
        );
    }
}
