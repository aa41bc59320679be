use super::{NewProduct, Product, ProductPatch};
use crate::{Error, Result};
use libsql::{Builder, Connection, Database, Row, params};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

const SELECT_COLUMNS: &str =
    "id, name, description, price, image, category, sub_category, bestseller, sizes, created_at";

/// A `:memory:` database lives only as long as its connection, so one is held open.
struct CatalogDb {
    _db: Database,
    conn: Connection,
}

pub struct CatalogStorage {
    db: Option<CatalogDb>,
    // In-memory fallback storage
    fallback: Arc<Mutex<Vec<Product>>>,
}

impl CatalogStorage {
    pub async fn new(db_path: &str) -> Result<Self> {
        let mut storage = Self {
            db: None,
            fallback: Arc::new(Mutex::new(Vec::new())),
        };

        match storage.init_database(db_path).await {
            Ok(()) => {
                info!("Catalog database initialized successfully: {}", db_path);
            }
            Err(e) => {
                warn!(
                    "Catalog database initialization failed, using in-memory fallback: {}",
                    e
                );
            }
        }

        Ok(storage)
    }

    async fn init_database(&mut self, db_path: &str) -> Result<()> {
        let db = Builder::new_local(db_path).build().await?;

        let conn = db.connect()?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL,
                image TEXT NOT NULL,
                category TEXT NOT NULL,
                sub_category TEXT NOT NULL,
                bestseller INTEGER NOT NULL DEFAULT 0,
                sizes TEXT NOT NULL,
                created_at DATETIME NOT NULL
            )
            "#,
            (),
        )
        .await?;

        self.db = Some(CatalogDb { _db: db, conn });
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Product>> {
        let Some(ref db) = self.db else {
            return Ok(self.lock_fallback()?.clone());
        };

        let conn = &db.conn;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLUMNS} FROM products ORDER BY created_at ASC, id ASC"),
                (),
            )
            .await?;

        let mut products = Vec::new();
        while let Some(row) = rows.next().await? {
            products.push(product_from_row(&row)?);
        }

        debug!("Listed {} products from database", products.len());
        Ok(products)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Product>> {
        let Some(ref db) = self.db else {
            let fallback = self.lock_fallback()?;
            return Ok(fallback.iter().find(|p| p.id == id).cloned());
        };

        let conn = &db.conn;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLUMNS} FROM products WHERE id = ?"),
                [id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(product_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, new_product: NewProduct) -> Result<Product> {
        new_product.validate()?;
        let product = new_product.into_product();

        match self.db {
            Some(ref db) => {
                let conn = &db.conn;
                conn.execute(
                    "INSERT INTO products (id, name, description, price, image, category, sub_category, bestseller, sizes, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        product.id.as_str(),
                        product.name.as_str(),
                        product.description.as_str(),
                        product.price,
                        serde_json::to_string(&product.image)?,
                        product.category.as_str(),
                        product.sub_category.as_str(),
                        product.bestseller as i64,
                        serde_json::to_string(&product.sizes)?,
                        product.date.to_rfc3339(),
                    ],
                )
                .await?;
            }
            None => self.lock_fallback()?.push(product.clone()),
        }

        info!("Created product {} ({})", product.id, product.name);
        Ok(product)
    }

    pub async fn update(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>> {
        let Some(ref db) = self.db else {
            let mut fallback = self.lock_fallback()?;
            let Some(product) = fallback.iter_mut().find(|p| p.id == id) else {
                return Ok(None);
            };
            patch.apply(product)?;
            return Ok(Some(product.clone()));
        };

        let Some(mut product) = self.get(id).await? else {
            return Ok(None);
        };
        patch.apply(&mut product)?;

        let conn = &db.conn;
        conn.execute(
            "UPDATE products SET name = ?, description = ?, price = ?, image = ?, category = ?, sub_category = ?, bestseller = ?, sizes = ? WHERE id = ?",
            params![
                product.name.as_str(),
                product.description.as_str(),
                product.price,
                serde_json::to_string(&product.image)?,
                product.category.as_str(),
                product.sub_category.as_str(),
                product.bestseller as i64,
                serde_json::to_string(&product.sizes)?,
                product.id.as_str(),
            ],
        )
        .await?;

        debug!("Updated product {}", product.id);
        Ok(Some(product))
    }

    /// Returns the removed product, if it existed.
    pub async fn delete(&self, id: &str) -> Result<Option<Product>> {
        let Some(ref db) = self.db else {
            let mut fallback = self.lock_fallback()?;
            let position = fallback.iter().position(|p| p.id == id);
            return Ok(position.map(|i| fallback.remove(i)));
        };

        let Some(product) = self.get(id).await? else {
            return Ok(None);
        };

        let conn = &db.conn;
        conn.execute("DELETE FROM products WHERE id = ?", [id]).await?;

        info!("Deleted product {}", id);
        Ok(Some(product))
    }

    fn lock_fallback(&self) -> Result<std::sync::MutexGuard<'_, Vec<Product>>> {
        self.fallback
            .lock()
            .map_err(|e| Error::internal(format!("Mutex lock failed: {e}")))
    }
}

fn product_from_row(row: &Row) -> Result<Product> {
    let image: String = row.get(4)?;
    let sizes: String = row.get(8)?;
    let bestseller: i64 = row.get(7)?;
    let created_at_str: String = row.get(9)?;
    let date = chrono::DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| Error::internal(format!("Failed to parse timestamp: {e}")))?
        .with_timezone(&chrono::Utc);

    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        image: serde_json::from_str(&image)?,
        category: row.get(5)?,
        sub_category: row.get(6)?,
        bestseller: bestseller != 0,
        sizes: serde_json::from_str(&sizes)?,
        date,
    })
}
