//! Demo supplier data and purchase-order maintenance.

use std::time::Instant;

use fake::Fake;
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

use super::SeedError;

const AR_PREFIXES: &[&str] = &["شركة", "مؤسسة", "مصنع", "مجموعة"];
const AR_SECTORS: &[&str] = &["الحديد", "البلاستيك", "التغليف", "الكيماويات", "قطع الغيار"];

#[derive(Debug, Clone)]
pub struct SupplierSeed {
    pub name: String,
    pub name_ar: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub tax_number: String,
}

pub fn generate_suppliers(count: usize) -> Vec<SupplierSeed> {
    (0..count)
        .map(|i| SupplierSeed {
            name: CompanyName().fake(),
            name_ar: format!(
                "{} {}",
                AR_PREFIXES[i % AR_PREFIXES.len()],
                AR_SECTORS[i % AR_SECTORS.len()]
            ),
            contact_person: Name().fake(),
            email: SafeEmail().fake(),
            phone: PhoneNumber().fake(),
            tax_number: format!("{:09}", (100_000_000..999_999_999u32).fake::<u32>()),
        })
        .collect()
}

/// Inserts `count` fake suppliers in one multi-row statement.
pub async fn seed_demo_suppliers(db: &PgPool, count: usize) -> Result<u64, SeedError> {
    if count == 0 {
        return Ok(0);
    }

    let start_time = Instant::now();
    let suppliers = generate_suppliers(count);

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO suppliers (name, name_ar, contact_person, email, phone, tax_number) ",
    );
    builder.push_values(&suppliers, |mut row, s| {
        row.push_bind(&s.name)
            .push_bind(&s.name_ar)
            .push_bind(&s.contact_person)
            .push_bind(&s.email)
            .push_bind(&s.phone)
            .push_bind(&s.tax_number);
    });

    let inserted = builder.build().execute(db).await?.rows_affected();

    info!(
        inserted,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Demo suppliers seeded"
    );
    Ok(inserted)
}

/// Deletes every purchase order (items cascade) and resets the numbering counters,
/// in one transaction.
pub async fn clear_purchase_orders(db: &PgPool) -> Result<u64, SeedError> {
    let mut tx = db.begin().await?;

    let deleted = sqlx::query("DELETE FROM purchase_orders")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    sqlx::query("DELETE FROM purchase_order_sequences")
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(deleted, "Purchase orders cleared");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_suppliers() {
        let suppliers = generate_suppliers(7);
        assert_eq!(suppliers.len(), 7);
        assert!(suppliers.iter().all(|s| !s.name.is_empty()));
        assert!(suppliers.iter().all(|s| s.email.contains('@')));
        assert!(suppliers.iter().all(|s| s.tax_number.len() == 9));
    }
}
