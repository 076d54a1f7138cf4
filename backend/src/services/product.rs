//! Product catalog service: products, variants, and categories

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::types::{PaginatedResponse, Pagination};
use shared::validation::validate_sku;

/// Product service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Product record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub unit: String,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub min_stock: Decimal,
    pub max_stock: Option<Decimal>,
    pub is_trackable: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product variant record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product with its variants
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithVariants {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<ProductVariant>,
}

/// One variant in a product create/update request
#[derive(Debug, Deserialize)]
pub struct VariantInput {
    pub name: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    #[serde(default)]
    pub min_stock: Decimal,
    pub max_stock: Option<Decimal>,
    pub is_trackable: Option<bool>,
    #[serde(default)]
    pub variants: Vec<VariantInput>,
}

/// Input for updating a product
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub min_stock: Option<Decimal>,
    pub max_stock: Option<Decimal>,
    pub is_trackable: Option<bool>,
    pub is_active: Option<bool>,
}

/// Input for creating/updating a category
#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// Filter for product listings
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List products
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Product>> {
        let pagination = pagination.normalized();
        let search = filter.search.map(|s| format!("%{}%", s));

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1 OR sku ILIKE $1 OR barcode ILIKE $1)
              AND ($2::uuid IS NULL OR category_id = $2)
              AND ($3::bool IS NULL OR is_active = $3)
            "#,
        )
        .bind(&search)
        .bind(filter.category_id)
        .bind(filter.is_active)
        .fetch_one(&self.db)
        .await?;

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, sku, barcode, category_id, description, unit,
                   cost_price, selling_price, min_stock, max_stock, is_trackable,
                   is_active, created_at, updated_at
            FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1 OR sku ILIKE $1 OR barcode ILIKE $1)
              AND ($2::uuid IS NULL OR category_id = $2)
              AND ($3::bool IS NULL OR is_active = $3)
            ORDER BY name
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&search)
        .bind(filter.category_id)
        .bind(filter.is_active)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(products, pagination, total as u64))
    }

    /// Get a product with its variants
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<ProductWithVariants> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, sku, barcode, category_id, description, unit,
                   cost_price, selling_price, min_stock, max_stock, is_trackable,
                   is_active, created_at, updated_at
            FROM products WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let variants = sqlx::query_as::<_, ProductVariant>(
            r#"
            SELECT id, product_id, name, sku, barcode, cost_price, selling_price,
                   is_active, created_at, updated_at
            FROM product_variants WHERE product_id = $1 ORDER BY name
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(ProductWithVariants { product, variants })
    }

    /// Create a product with optional variants
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<ProductWithVariants> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name cannot be empty".to_string(),
                message_id: "Nama produk tidak boleh kosong".to_string(),
            });
        }
        validate_sku(&input.sku).map_err(|msg| AppError::ValidationError(msg.to_string()))?;
        for variant in &input.variants {
            validate_sku(&variant.sku)
                .map_err(|msg| AppError::ValidationError(msg.to_string()))?;
        }

        self.ensure_sku_free(&input.sku, None).await?;

        if let Some(category_id) = input.category_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)",
            )
            .bind(category_id)
            .fetch_one(&self.db)
            .await?;
            if !exists {
                return Err(AppError::NotFound("Category".to_string()));
            }
        }

        let unit = input.unit.unwrap_or_else(|| "pcs".to_string());
        let is_trackable = input.is_trackable.unwrap_or(true);

        let mut tx = self.db.begin().await?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                name, sku, barcode, category_id, description, unit, cost_price,
                selling_price, min_stock, max_stock, is_trackable
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, name, sku, barcode, category_id, description, unit,
                      cost_price, selling_price, min_stock, max_stock, is_trackable,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.sku)
        .bind(&input.barcode)
        .bind(input.category_id)
        .bind(&input.description)
        .bind(&unit)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .bind(input.min_stock)
        .bind(input.max_stock)
        .bind(is_trackable)
        .fetch_one(&mut *tx)
        .await?;

        let mut variants = Vec::with_capacity(input.variants.len());
        for variant in &input.variants {
            let created = sqlx::query_as::<_, ProductVariant>(
                r#"
                INSERT INTO product_variants (product_id, name, sku, barcode, cost_price, selling_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, product_id, name, sku, barcode, cost_price, selling_price,
                          is_active, created_at, updated_at
                "#,
            )
            .bind(product.id)
            .bind(&variant.name)
            .bind(&variant.sku)
            .bind(&variant.barcode)
            .bind(variant.cost_price)
            .bind(variant.selling_price)
            .fetch_one(&mut *tx)
            .await?;
            variants.push(created);
        }

        tx.commit().await?;

        Ok(ProductWithVariants { product, variants })
    }

    /// Update a product
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<ProductWithVariants> {
        let existing = self.get_product(product_id).await?;
        let p = existing.product;

        let name = input.name.unwrap_or(p.name);
        let barcode = input.barcode.or(p.barcode);
        let category_id = input.category_id.or(p.category_id);
        let description = input.description.or(p.description);
        let unit = input.unit.unwrap_or(p.unit);
        let cost_price = input.cost_price.unwrap_or(p.cost_price);
        let selling_price = input.selling_price.unwrap_or(p.selling_price);
        let min_stock = input.min_stock.unwrap_or(p.min_stock);
        let max_stock = input.max_stock.or(p.max_stock);
        let is_trackable = input.is_trackable.unwrap_or(p.is_trackable);
        let is_active = input.is_active.unwrap_or(p.is_active);

        sqlx::query(
            r#"
            UPDATE products
            SET name = $1, barcode = $2, category_id = $3, description = $4,
                unit = $5, cost_price = $6, selling_price = $7, min_stock = $8,
                max_stock = $9, is_trackable = $10, is_active = $11, updated_at = NOW()
            WHERE id = $12
            "#,
        )
        .bind(&name)
        .bind(&barcode)
        .bind(category_id)
        .bind(&description)
        .bind(&unit)
        .bind(cost_price)
        .bind(selling_price)
        .bind(min_stock)
        .bind(max_stock)
        .bind(is_trackable)
        .bind(is_active)
        .bind(product_id)
        .execute(&self.db)
        .await?;

        self.get_product(product_id).await
    }

    /// Deactivate a product (sales history keeps the row alive)
    pub async fn delete_product(&self, product_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_active = false, updated_at = NOW() WHERE id = $1",
        )
        .bind(product_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }
        Ok(())
    }

    /// List categories
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, code, description, parent_id, status, created_at, updated_at
            FROM categories ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    /// Get a category by id
    pub async fn get_category(&self, category_id: Uuid) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, code, description, parent_id, status, created_at, updated_at
            FROM categories WHERE id = $1
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    /// Create a category
    pub async fn create_category(&self, input: CategoryInput) -> AppResult<Category> {
        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE code = $1")
                .bind(&input.code)
                .fetch_one(&self.db)
                .await?;
        if existing > 0 {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, code, description, parent_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, code, description, parent_id, status, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.parent_id)
        .fetch_one(&self.db)
        .await?;

        Ok(category)
    }

    /// Update a category
    pub async fn update_category(
        &self,
        category_id: Uuid,
        input: CategoryInput,
    ) -> AppResult<Category> {
        self.get_category(category_id).await?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $1, code = $2, description = $3, parent_id = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING id, name, code, description, parent_id, status, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.parent_id)
        .bind(category_id)
        .fetch_one(&self.db)
        .await?;

        Ok(category)
    }

    /// Delete a category with no products
    pub async fn delete_category(&self, category_id: Uuid) -> AppResult<()> {
        self.get_category(category_id).await?;

        let products =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(&self.db)
                .await?;
        if products > 0 {
            return Err(AppError::Conflict {
                resource: "category".to_string(),
                message: "Category still has products".to_string(),
                message_id: "Kategori masih memiliki produk".to_string(),
            });
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn ensure_sku_free(&self, sku: &str, exclude: Option<Uuid>) -> AppResult<()> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT (SELECT COUNT(*) FROM products WHERE sku = $1 AND ($2::uuid IS NULL OR id <> $2))
                 + (SELECT COUNT(*) FROM product_variants WHERE sku = $1)
            "#,
        )
        .bind(sku)
        .bind(exclude)
        .fetch_one(&self.db)
        .await?;

        if count > 0 {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }
        Ok(())
    }
}
