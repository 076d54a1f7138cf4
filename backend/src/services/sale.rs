//! Sales service: POS checkout, sale queries, and sales statistics
//!
//! Checkout is the busiest stock-affecting business event: one database
//! transaction covers the sale row, its items and payments, one outbound
//! stock movement per trackable item, discount usage tracking, and
//! customer loyalty updates. If any line has insufficient store stock the
//! whole checkout rolls back and no sale record is created.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::{self, MovementContext, StockOperation};
use shared::models::{
    compute_sale_totals, discount_is_applicable, loyalty_points_earned, LocationRef,
    PaymentStatus, ReferenceKind, SaleLine, SaleStatus,
};
use shared::types::{PaginatedResponse, Pagination};
use shared::validation::validate_movement_magnitude;

/// Sales service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// Sale record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Sale {
    pub id: Uuid,
    pub sale_number: String,
    pub store_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub cashier_id: Uuid,
    pub discount_id: Option<Uuid>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub change_amount: Decimal,
    pub payment_status: String,
    pub sale_status: String,
    pub payment_method: String,
    pub notes: Option<String>,
    pub sale_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sale line item record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub product_variant_id: Option<Uuid>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount_amount: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Sale payment record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SalePayment {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub payment_method: String,
    pub amount: Decimal,
    pub reference_number: Option<String>,
    pub status: String,
    pub processed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Sale with its items and payments
#[derive(Debug, Clone, Serialize)]
pub struct SaleWithDetails {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub payments: Vec<SalePayment>,
}

/// One checkout line
#[derive(Debug, Deserialize)]
pub struct SaleItemInput {
    pub product_id: Uuid,
    pub product_variant_id: Option<Uuid>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
}

/// One tendered payment
#[derive(Debug, Deserialize)]
pub struct SalePaymentInput {
    pub payment_method: String,
    pub amount: Decimal,
    pub reference_number: Option<String>,
}

/// Input for creating a sale (POS checkout)
#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    pub store_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub discount_id: Option<Uuid>,
    #[serde(default)]
    pub points_redeemed: i32,
    pub items: Vec<SaleItemInput>,
    pub payments: Vec<SalePaymentInput>,
    #[serde(default)]
    pub tax_amount: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    pub notes: Option<String>,
}

/// Input for updating a draft sale
#[derive(Debug, Deserialize)]
pub struct UpdateSaleInput {
    pub customer_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Filter for sale listings
#[derive(Debug, Default, Deserialize)]
pub struct SaleFilter {
    pub store_id: Option<Uuid>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Sales statistics
#[derive(Debug, Clone, Serialize)]
pub struct SalesStats {
    pub total_sales: i64,
    pub total_revenue: Decimal,
    pub today_sales: i64,
    pub today_revenue: Decimal,
    pub average_sale: Decimal,
}

/// Product fields checkout needs
#[derive(Debug, FromRow)]
struct ProductForSale {
    is_active: bool,
    is_trackable: bool,
}

/// Discount fields checkout needs
#[derive(Debug, FromRow)]
struct DiscountForSale {
    is_active: bool,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    usage_limit: i32,
    usage_count: i32,
    min_purchase: Decimal,
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a completed sale (POS checkout)
    pub async fn create_sale(
        &self,
        cashier_id: Uuid,
        input: CreateSaleInput,
    ) -> AppResult<SaleWithDetails> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Sale must have at least one item".to_string(),
                message_id: "Penjualan harus memiliki minimal satu item".to_string(),
            });
        }
        if input.payments.is_empty() {
            return Err(AppError::Validation {
                field: "payments".to_string(),
                message: "Sale must have at least one payment".to_string(),
                message_id: "Penjualan harus memiliki minimal satu pembayaran".to_string(),
            });
        }
        for item in &input.items {
            validate_movement_magnitude(item.quantity)
                .map_err(|msg| AppError::ValidationError(msg.to_string()))?;
        }

        // Validate store exists
        let store_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM stores WHERE id = $1)")
                .bind(input.store_id)
                .fetch_one(&self.db)
                .await?;
        if !store_exists {
            return Err(AppError::NotFound("Store".to_string()));
        }

        let lines: Vec<SaleLine> = input
            .items
            .iter()
            .map(|i| SaleLine {
                quantity: i.quantity,
                unit_price: i.unit_price,
                discount_amount: i.discount_amount,
            })
            .collect();
        let payment_amounts: Vec<Decimal> = input.payments.iter().map(|p| p.amount).collect();
        let totals = compute_sale_totals(
            &lines,
            input.tax_amount,
            input.discount_amount,
            &payment_amounts,
        );

        // Validate discount applicability before touching anything
        if let Some(discount_id) = input.discount_id {
            let discount = sqlx::query_as::<_, DiscountForSale>(
                r#"
                SELECT is_active, start_date, end_date, usage_limit, usage_count, min_purchase
                FROM discounts WHERE id = $1
                "#,
            )
            .bind(discount_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Discount".to_string()))?;

            if !discount_is_applicable(
                discount.is_active,
                discount.start_date,
                discount.end_date,
                discount.usage_limit,
                discount.usage_count,
                totals.subtotal,
                discount.min_purchase,
                Utc::now(),
            ) {
                return Err(AppError::ValidationError(
                    "Discount is not applicable to this sale".to_string(),
                ));
            }
        }

        // Validate points redemption
        if input.points_redeemed > 0 {
            let customer_id = input.customer_id.ok_or_else(|| {
                AppError::ValidationError("Points redemption requires a customer".to_string())
            })?;
            let (is_member, loyalty_points) = sqlx::query_as::<_, (bool, i32)>(
                "SELECT is_member, loyalty_points FROM customers WHERE id = $1",
            )
            .bind(customer_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

            if !is_member {
                return Err(AppError::ValidationError(
                    "Only members can redeem points".to_string(),
                ));
            }
            if loyalty_points < input.points_redeemed {
                return Err(AppError::ValidationError(
                    "Insufficient loyalty points".to_string(),
                ));
            }
        }

        let primary_payment_method = input.payments[0].payment_method.clone();
        let sale_number = generate_sale_number();

        let mut tx = self.db.begin().await?;

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (
                sale_number, store_id, customer_id, cashier_id, discount_id,
                subtotal, tax_amount, discount_amount, total_amount, paid_amount,
                change_amount, payment_status, sale_status, payment_method, notes, sale_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, NOW())
            RETURNING id, sale_number, store_id, customer_id, cashier_id, discount_id,
                      subtotal, tax_amount, discount_amount, total_amount, paid_amount,
                      change_amount, payment_status, sale_status, payment_method, notes,
                      sale_date, created_at, updated_at
            "#,
        )
        .bind(&sale_number)
        .bind(input.store_id)
        .bind(input.customer_id)
        .bind(cashier_id)
        .bind(input.discount_id)
        .bind(totals.subtotal)
        .bind(totals.tax_amount)
        .bind(totals.discount_amount)
        .bind(totals.total_amount)
        .bind(totals.paid_amount)
        .bind(totals.change_amount)
        .bind(PaymentStatus::Paid.as_str())
        .bind(SaleStatus::Completed.as_str())
        .bind(&primary_payment_method)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        // Items and stock movements. Outbound movements are rejected by the
        // stock engine if the store balance is insufficient, rolling back
        // the entire checkout.
        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let product = sqlx::query_as::<_, ProductForSale>(
                "SELECT is_active, is_trackable FROM products WHERE id = $1",
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

            if !product.is_active {
                return Err(AppError::ValidationError(format!(
                    "Product {} is inactive",
                    item.product_id
                )));
            }

            let line = SaleLine {
                quantity: item.quantity,
                unit_price: item.unit_price,
                discount_amount: item.discount_amount,
            };

            let created = sqlx::query_as::<_, SaleItem>(
                r#"
                INSERT INTO sale_items (
                    sale_id, product_id, product_variant_id, quantity,
                    unit_price, discount_amount, total_price
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, sale_id, product_id, product_variant_id, quantity,
                          unit_price, discount_amount, total_price, created_at
                "#,
            )
            .bind(sale.id)
            .bind(item.product_id)
            .bind(item.product_variant_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.discount_amount)
            .bind(line.total_price())
            .fetch_one(&mut *tx)
            .await?;
            items.push(created);

            // Untracked products (services, fees) skip stock movements
            if product.is_trackable {
                stock::apply_movement(
                    &mut tx,
                    item.product_id,
                    item.product_variant_id,
                    LocationRef::store(input.store_id),
                    StockOperation::Outbound {
                        quantity: item.quantity,
                    },
                    MovementContext {
                        reference_kind: ReferenceKind::Sale,
                        reference_id: Some(sale.id),
                        unit_cost: Some(item.unit_price),
                        notes: None,
                        created_by: cashier_id,
                    },
                )
                .await?;
            }
        }

        let mut payments = Vec::with_capacity(input.payments.len());
        for payment in &input.payments {
            let created = sqlx::query_as::<_, SalePayment>(
                r#"
                INSERT INTO sale_payments (sale_id, payment_method, amount, reference_number, status)
                VALUES ($1, $2, $3, $4, 'completed')
                RETURNING id, sale_id, payment_method, amount, reference_number, status,
                          processed_at, created_at
                "#,
            )
            .bind(sale.id)
            .bind(&payment.payment_method)
            .bind(payment.amount)
            .bind(&payment.reference_number)
            .fetch_one(&mut *tx)
            .await?;
            payments.push(created);
        }

        // Track discount usage
        if let Some(discount_id) = input.discount_id {
            if totals.discount_amount > Decimal::ZERO {
                sqlx::query("UPDATE discounts SET usage_count = usage_count + 1 WHERE id = $1")
                    .bind(discount_id)
                    .execute(&mut *tx)
                    .await?;

                sqlx::query(
                    r#"
                    INSERT INTO discount_usages (discount_id, customer_id, sale_id, amount)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(discount_id)
                .bind(input.customer_id)
                .bind(sale.id)
                .bind(totals.discount_amount)
                .execute(&mut *tx)
                .await?;
            }
        }

        // Customer stats and loyalty
        if let Some(customer_id) = input.customer_id {
            let earn_threshold = self.loyalty_earn_threshold(&mut tx).await?;
            let earned = loyalty_points_earned(totals.total_amount, earn_threshold);
            let net_points = earned - input.points_redeemed;

            sqlx::query(
                r#"
                UPDATE customers
                SET total_spent = total_spent + $1,
                    last_visit = NOW(),
                    loyalty_points = CASE WHEN is_member THEN loyalty_points + $2 ELSE loyalty_points END
                WHERE id = $3
                "#,
            )
            .bind(totals.total_amount)
            .bind(net_points)
            .bind(customer_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            sale_number = %sale_number,
            store_id = %input.store_id,
            total = %totals.total_amount,
            items = items.len(),
            "sale completed"
        );

        Ok(SaleWithDetails {
            sale,
            items,
            payments,
        })
    }

    /// Get a sale with items and payments
    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<SaleWithDetails> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_number, store_id, customer_id, cashier_id, discount_id,
                   subtotal, tax_amount, discount_amount, total_amount, paid_amount,
                   change_amount, payment_status, sale_status, payment_method, notes,
                   sale_date, created_at, updated_at
            FROM sales WHERE id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, product_variant_id, quantity,
                   unit_price, discount_amount, total_price, created_at
            FROM sale_items WHERE sale_id = $1 ORDER BY created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?;

        let payments = sqlx::query_as::<_, SalePayment>(
            r#"
            SELECT id, sale_id, payment_method, amount, reference_number, status,
                   processed_at, created_at
            FROM sale_payments WHERE sale_id = $1 ORDER BY created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?;

        Ok(SaleWithDetails {
            sale,
            items,
            payments,
        })
    }

    /// List sales with filters, newest first
    pub async fn list_sales(
        &self,
        filter: SaleFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Sale>> {
        let pagination = pagination.normalized();
        let search = filter.search.map(|s| format!("%{}%", s));

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM sales
            WHERE ($1::uuid IS NULL OR store_id = $1)
              AND ($2::text IS NULL OR sale_status = $2)
              AND ($3::text IS NULL OR sale_number ILIKE $3 OR notes ILIKE $3)
              AND ($4::date IS NULL OR sale_date::date >= $4)
              AND ($5::date IS NULL OR sale_date::date <= $5)
            "#,
        )
        .bind(filter.store_id)
        .bind(&filter.status)
        .bind(&search)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .fetch_one(&self.db)
        .await?;

        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_number, store_id, customer_id, cashier_id, discount_id,
                   subtotal, tax_amount, discount_amount, total_amount, paid_amount,
                   change_amount, payment_status, sale_status, payment_method, notes,
                   sale_date, created_at, updated_at
            FROM sales
            WHERE ($1::uuid IS NULL OR store_id = $1)
              AND ($2::text IS NULL OR sale_status = $2)
              AND ($3::text IS NULL OR sale_number ILIKE $3 OR notes ILIKE $3)
              AND ($4::date IS NULL OR sale_date::date >= $4)
              AND ($5::date IS NULL OR sale_date::date <= $5)
            ORDER BY sale_date DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(filter.store_id)
        .bind(&filter.status)
        .bind(&search)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(sales, pagination, total as u64))
    }

    /// Update a draft sale. Completed sales are immutable.
    pub async fn update_sale(&self, sale_id: Uuid, input: UpdateSaleInput) -> AppResult<Sale> {
        let (status,) =
            sqlx::query_as::<_, (String,)>("SELECT sale_status FROM sales WHERE id = $1")
                .bind(sale_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        if SaleStatus::from_str(&status) != Some(SaleStatus::Draft) {
            return Err(AppError::InvalidStateTransition(
                "Cannot update a completed sale".to_string(),
            ));
        }

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales
            SET customer_id = COALESCE($1, customer_id),
                notes = COALESCE($2, notes),
                updated_at = NOW()
            WHERE id = $3
            RETURNING id, sale_number, store_id, customer_id, cashier_id, discount_id,
                      subtotal, tax_amount, discount_amount, total_amount, paid_amount,
                      change_amount, payment_status, sale_status, payment_method, notes,
                      sale_date, created_at, updated_at
            "#,
        )
        .bind(input.customer_id)
        .bind(&input.notes)
        .bind(sale_id)
        .fetch_one(&self.db)
        .await?;

        Ok(sale)
    }

    /// Sales statistics for completed sales, optionally scoped to a store
    /// and date range
    pub async fn get_stats(
        &self,
        store_id: Option<Uuid>,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> AppResult<SalesStats> {
        let (total_sales, total_revenue) = sqlx::query_as::<_, (i64, Decimal)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount), 0)
            FROM sales
            WHERE sale_status = 'completed'
              AND ($1::uuid IS NULL OR store_id = $1)
              AND ($2::date IS NULL OR sale_date::date >= $2)
              AND ($3::date IS NULL OR sale_date::date <= $3)
            "#,
        )
        .bind(store_id)
        .bind(date_from)
        .bind(date_to)
        .fetch_one(&self.db)
        .await?;

        let (today_sales, today_revenue) = sqlx::query_as::<_, (i64, Decimal)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount), 0)
            FROM sales
            WHERE sale_status = 'completed'
              AND sale_date::date = CURRENT_DATE
              AND ($1::uuid IS NULL OR store_id = $1)
            "#,
        )
        .bind(store_id)
        .fetch_one(&self.db)
        .await?;

        let average_sale = if total_sales > 0 {
            total_revenue / Decimal::from(total_sales)
        } else {
            Decimal::ZERO
        };

        Ok(SalesStats {
            total_sales,
            total_revenue,
            today_sales,
            today_revenue,
            average_sale,
        })
    }

    /// Loyalty earn threshold from settings; zero disables earning
    async fn loyalty_earn_threshold(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<Decimal> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM settings WHERE key = 'loyalty_min_purchase'",
        )
        .fetch_optional(&mut **tx)
        .await?;

        Ok(value
            .and_then(|v| v.parse::<Decimal>().ok())
            .unwrap_or_else(|| Decimal::from(10000)))
    }
}

/// Generate a unique sale number: TRX + date + epoch millis
fn generate_sale_number() -> String {
    let now = Utc::now();
    format!("TRX{}{}", now.format("%Y%m%d"), now.timestamp_millis())
}
