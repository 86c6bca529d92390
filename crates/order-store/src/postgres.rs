use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId};
use domain::{Money, NewOrder, Order, OrderStatus, Quantity};
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};

use crate::{OrderStoreError, Result, store::OrderStore};

// Money travels as integer cents; the column is NUMERIC(12,2).
const SELECT_ORDERS: &str = r#"
    SELECT id, user_id, product_id, quantity, (total_price * 100)::BIGINT AS total_price_cents,
           status, created_at
    FROM orders
"#;

const INSERT_ORDER: &str = r#"
    INSERT INTO orders (user_id, product_id, quantity, total_price, status)
    VALUES ($1, $2, $3, $4::BIGINT / 100.0, $5)
    RETURNING id, created_at
"#;

/// PostgreSQL-backed order store.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    async fn insert(conn: &mut PgConnection, order: &NewOrder) -> Result<Order> {
        let row = sqlx::query(INSERT_ORDER)
            .bind(order.user_id.as_i64())
            .bind(order.product_id.as_i64())
            .bind(order.quantity.get())
            .bind(order.total_price.cents())
            .bind(order.status.as_str())
            .fetch_one(conn)
            .await?;

        let id = OrderId::new(row.try_get("id")?);
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok(order.into_order(id, created_at))
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let id: i64 = row.try_get("id")?;
        let quantity: i32 = row.try_get("quantity")?;
        let status: String = row.try_get("status")?;

        let corrupt = |source| OrderStoreError::CorruptRow { id, source };

        Ok(Order {
            id: OrderId::new(id),
            user_id: UserId::new(row.try_get("user_id")?),
            product_id: ProductId::new(row.try_get("product_id")?),
            quantity: Quantity::new(i64::from(quantity)).map_err(corrupt)?,
            total_price: Money::from_cents(row.try_get("total_price_cents")?),
            status: status.parse::<OrderStatus>().map_err(corrupt)?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        let mut conn = self.pool.acquire().await?;
        let order = Self::insert(&mut conn, &order).await?;
        tracing::debug!(order_id = %order.id, "order row inserted");
        Ok(order)
    }

    async fn create_orders(&self, orders: Vec<NewOrder>) -> Result<Vec<Order>> {
        // Dropping the transaction on an early return rolls it back.
        let mut tx = self.pool.begin().await?;

        let mut created = Vec::with_capacity(orders.len());
        for order in &orders {
            created.push(Self::insert(&mut tx, order).await?);
        }

        tx.commit().await?;
        tracing::debug!(count = created.len(), "order batch committed");
        Ok(created)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("{SELECT_ORDERS} WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!("{SELECT_ORDERS} ORDER BY id DESC"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "{SELECT_ORDERS} WHERE user_id = $1 ORDER BY id DESC"
        ))
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
