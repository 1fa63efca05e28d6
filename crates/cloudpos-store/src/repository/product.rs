//! # Product Cache Repository
//!
//! Local mirror of remote product rows so the point-of-sale screen keeps
//! working while offline.
//!
//! ## Refresh Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Cache Refresh                                │
//! │                                                                         │
//! │  Remote product table                                                   │
//! │       │  fetch (while online)                                           │
//! │       ▼                                                                 │
//! │  replace_all(products)                                                  │
//! │  ┌─────────────────────────────────────────┐                            │
//! │  │           SINGLE TRANSACTION            │                            │
//! │  │  1. DELETE FROM cached_products         │                            │
//! │  │  2. INSERT each fetched row             │                            │
//! │  └─────────────────────────────────────────┘                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← all-or-nothing: a failed refresh leaves the previous          │
//! │           cache intact, never a half-replaced one                       │
//! │                                                                         │
//! │  Wholesale replacement, not a merge - the cache has no versioning       │
//! │  and the remote side is always the source of truth.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use cloudpos_core::{CachedProduct, Money};

use crate::error::StoreResult;

/// Repository for the offline product cache.
#[derive(Debug, Clone)]
pub struct ProductCacheRepository {
    pool: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    store_id: String,
    name: String,
    price_cents: i64,
    stock_quantity: i64,
    category: String,
}

impl From<ProductRow> for CachedProduct {
    fn from(row: ProductRow) -> Self {
        CachedProduct {
            id: row.id,
            store_id: row.store_id,
            name: row.name,
            price: Money::from_cents(row.price_cents),
            stock_quantity: row.stock_quantity,
            category: row.category,
        }
    }
}

impl ProductCacheRepository {
    /// Creates a new ProductCacheRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductCacheRepository { pool }
    }

    /// Atomically clears and repopulates the cache.
    ///
    /// Either the whole new snapshot lands or the previous one survives;
    /// there is no partially-replaced state.
    pub async fn replace_all(&self, products: &[CachedProduct]) -> StoreResult<()> {
        debug!(count = products.len(), "Replacing product cache");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cached_products")
            .execute(&mut *tx)
            .await?;

        for product in products {
            sqlx::query(
                r#"
                INSERT INTO cached_products (
                    id, store_id, name, price_cents, stock_quantity, category
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&product.id)
            .bind(&product.store_id)
            .bind(&product.name)
            .bind(product.price.cents())
            .bind(product.stock_quantity)
            .bind(&product.category)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Lists cached products for one store.
    pub async fn list_for_store(&self, store_id: &str) -> StoreResult<Vec<CachedProduct>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, store_id, name, price_cents, stock_quantity, category
            FROM cached_products
            WHERE store_id = ?1
            ORDER BY name ASC
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CachedProduct::from).collect())
    }

    /// Removes a single product from the cache.
    ///
    /// The local half of the two-phase remote-then-local delete; returns
    /// whether a row was actually removed.
    pub async fn delete(&self, product_id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM cached_products WHERE id = ?1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts all cached products.
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cached_products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{LocalStore, StoreConfig};

    fn product(id: &str, store_id: &str, price_cents: i64) -> CachedProduct {
        CachedProduct {
            id: id.to_string(),
            store_id: store_id.to_string(),
            name: format!("Product {}", id),
            price: Money::from_cents(price_cents),
            stock_quantity: 25,
            category: "beverages".to_string(),
        }
    }

    #[tokio::test]
    async fn test_replace_all_then_list() {
        let store = LocalStore::open(StoreConfig::in_memory()).await.unwrap();
        let repo = store.products();

        repo.replace_all(&[
            product("p1", "store-1", 300),
            product("p2", "store-1", 500),
            product("p3", "store-2", 150),
        ])
        .await
        .unwrap();

        let for_one = repo.list_for_store("store-1").await.unwrap();
        assert_eq!(for_one.len(), 2);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_replace_all_clears_previous_snapshot() {
        let store = LocalStore::open(StoreConfig::in_memory()).await.unwrap();
        let repo = store.products();

        repo.replace_all(&[product("p1", "store-1", 300)])
            .await
            .unwrap();
        repo.replace_all(&[product("p2", "store-1", 500)])
            .await
            .unwrap();

        let products = repo.list_for_store("store-1").await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "p2");
    }

    #[tokio::test]
    async fn test_replace_all_with_empty_snapshot() {
        let store = LocalStore::open(StoreConfig::in_memory()).await.unwrap();
        let repo = store.products();

        repo.replace_all(&[product("p1", "store-1", 300)])
            .await
            .unwrap();
        repo.replace_all(&[]).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_single_product() {
        let store = LocalStore::open(StoreConfig::in_memory()).await.unwrap();
        let repo = store.products();

        repo.replace_all(&[product("p1", "store-1", 300)])
            .await
            .unwrap();

        assert!(repo.delete("p1").await.unwrap());
        assert!(!repo.delete("p1").await.unwrap()); // already gone
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_price_round_trips_as_cents() {
        let store = LocalStore::open(StoreConfig::in_memory()).await.unwrap();
        let repo = store.products();

        repo.replace_all(&[product("p1", "store-1", 1099)])
            .await
            .unwrap();

        let products = repo.list_for_store("store-1").await.unwrap();
        assert_eq!(products[0].price, Money::from_cents(1099));
    }
}
