//! Subscription repository implementation
//!
//! Provides PostgreSQL-backed storage for subscriptions and the period cost
//! aggregation. Statements with optional parts are assembled with
//! `QueryBuilder`, so every user-supplied value travels as a bind parameter.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use subtrack_core::{
    models::{CostFilter, NewSubscription, Subscription, SubscriptionUpdate, TotalCost},
    traits::{ListParams, SubscriptionRepository},
    AppError, AppResult,
};
use tracing::{debug, error, instrument};
use uuid::Uuid;

const SUBSCRIPTION_COLUMNS: &str =
    "id, service_name, price, user_id, start_date, end_date, created_at";

/// Database row representation of a subscription
#[derive(Debug, FromRow)]
struct SubscriptionRow {
    id: i64,
    service_name: String,
    price: i32,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            id: row.id,
            service_name: row.service_name,
            price: row.price,
            user_id: row.user_id,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct TotalCostRow {
    total_cost: i64,
    count: i64,
}

/// Build the partial `UPDATE` statement, or `None` when nothing changes
pub fn build_update_query(
    id: i64,
    changes: &SubscriptionUpdate,
) -> Option<QueryBuilder<'static, Postgres>> {
    if changes.is_empty() {
        return None;
    }

    let mut builder = QueryBuilder::new("UPDATE subscriptions SET ");
    {
        let mut assignments = builder.separated(", ");

        if let Some(name) = &changes.service_name {
            assignments.push("service_name = ");
            assignments.push_bind_unseparated(name.clone());
        }
        if let Some(price) = changes.price {
            assignments.push("price = ");
            assignments.push_bind_unseparated(price);
        }
        if let Some(end_date) = changes.end_date {
            assignments.push("end_date = ");
            assignments.push_bind_unseparated(end_date);
        }
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING ");
    builder.push(SUBSCRIPTION_COLUMNS);

    Some(builder)
}

/// Build the cost aggregation query for a filter
///
/// A subscription counts when it starts on or before the last day of the
/// end month and has no end date or ends on or after the start month.
pub fn build_total_cost_query(filter: &CostFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT COALESCE(SUM(price), 0)::BIGINT AS total_cost, COUNT(*)::BIGINT AS count \
         FROM subscriptions WHERE start_date <= ",
    );
    builder.push_bind(filter.period_end());
    builder.push(" AND (end_date IS NULL OR end_date >= ");
    builder.push_bind(filter.start_period);
    builder.push(")");

    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ");
        builder.push_bind(user_id);
    }
    if let Some(service_name) = &filter.service_name {
        builder.push(" AND service_name = ");
        builder.push_bind(service_name.clone());
    }

    builder
}

/// PostgreSQL implementation of the subscription repository
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn create(&self, input: &NewSubscription) -> AppResult<Subscription> {
        debug!(service_name = %input.service_name, "Creating subscription");

        let row = sqlx::query_as::<Postgres, SubscriptionRow>(
            r#"
            INSERT INTO subscriptions (service_name, price, user_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, service_name, price, user_id, start_date, end_date, created_at
            "#,
        )
        .bind(&input.service_name)
        .bind(input.price)
        .bind(input.user_id)
        .bind(input.start_date)
        .bind(input.end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating subscription: {}", e);
            AppError::Database(format!("Failed to create subscription: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Subscription>> {
        debug!("Finding subscription by id: {}", id);

        let result = sqlx::query_as::<Postgres, SubscriptionRow>(
            r#"
            SELECT id, service_name, price, user_id, start_date, end_date, created_at
            FROM subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding subscription {}: {}", id, e);
            AppError::Database(format!("Failed to find subscription: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list(&self, params: ListParams) -> AppResult<Vec<Subscription>> {
        debug!("Listing subscriptions");

        let rows = sqlx::query_as::<Postgres, SubscriptionRow>(
            r#"
            SELECT id, service_name, price, user_id, start_date, end_date, created_at
            FROM subscriptions
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing subscriptions: {}", e);
            AppError::Database(format!("Failed to list subscriptions: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn list_by_user(
        &self,
        user_id: Uuid,
        params: ListParams,
    ) -> AppResult<Vec<Subscription>> {
        debug!("Listing subscriptions for user {}", user_id);

        let rows = sqlx::query_as::<Postgres, SubscriptionRow>(
            r#"
            SELECT id, service_name, price, user_id, start_date, end_date, created_at
            FROM subscriptions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing subscriptions for user {}: {}", user_id, e);
            AppError::Database(format!("Failed to list user subscriptions: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, changes))]
    async fn update(
        &self,
        id: i64,
        changes: &SubscriptionUpdate,
    ) -> AppResult<Option<Subscription>> {
        let Some(mut query) = build_update_query(id, changes) else {
            debug!("Empty update for subscription {}, returning current state", id);
            return self.find_by_id(id).await;
        };

        debug!("Updating subscription: {}", id);

        let row = query
            .build_query_as::<SubscriptionRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating subscription {}: {}", id, e);
                AppError::Database(format!("Failed to update subscription: {}", e))
            })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> AppResult<bool> {
        debug!("Deleting subscription: {}", id);

        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting subscription {}: {}", id, e);
                AppError::Database(format!("Failed to delete subscription: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(
        skip(self, filter),
        fields(start = %filter.start_period, end = %filter.period_end())
    )]
    async fn total_cost(&self, filter: &CostFilter) -> AppResult<TotalCost> {
        debug!("Calculating total cost");

        let mut query = build_total_cost_query(filter);
        let row = query
            .build_query_as::<TotalCostRow>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error calculating total cost: {}", e);
                AppError::Database(format!("Failed to calculate total cost: {}", e))
            })?;

        Ok(TotalCost {
            total_cost: row.total_cost,
            count: row.count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_update_builds_nothing() {
        assert!(build_update_query(1, &SubscriptionUpdate::default()).is_none());
    }

    #[test]
    fn test_update_query_only_supplied_fields() {
        let changes = SubscriptionUpdate {
            price: Some(800),
            ..Default::default()
        };
        let query = build_update_query(7, &changes).unwrap();

        assert_eq!(
            query.sql(),
            "UPDATE subscriptions SET price = $1 WHERE id = $2 RETURNING \
             id, service_name, price, user_id, start_date, end_date, created_at"
        );
    }

    #[test]
    fn test_update_query_all_fields() {
        let changes = SubscriptionUpdate {
            service_name: Some("Netflix'; DROP TABLE subscriptions; --".to_string()),
            price: Some(800),
            end_date: Some(ymd(2025, 12, 1)),
        };
        let query = build_update_query(7, &changes).unwrap();

        assert!(query.sql().starts_with(
            "UPDATE subscriptions SET service_name = $1, price = $2, \
             end_date = $3 WHERE id = $4"
        ));
        assert!(!query.sql().contains("DROP TABLE"));
    }

    #[test]
    fn test_total_cost_query_without_filters() {
        let filter = CostFilter::new(ymd(2024, 1, 1), ymd(2024, 12, 1));
        let query = build_total_cost_query(&filter);

        assert_eq!(
            query.sql(),
            "SELECT COALESCE(SUM(price), 0)::BIGINT AS total_cost, COUNT(*)::BIGINT AS count \
             FROM subscriptions WHERE start_date <= $1 AND (end_date IS NULL OR end_date >= $2)"
        );
    }

    #[test]
    fn test_total_cost_query_with_filters() {
        let filter = CostFilter::new(ymd(2024, 1, 1), ymd(2024, 12, 1))
            .with_user(Uuid::new_v4())
            .with_service("Netflix");
        let query = build_total_cost_query(&filter);

        assert!(query
            .sql()
            .ends_with("AND user_id = $3 AND service_name = $4"));
    }

    #[test]
    fn test_total_cost_query_service_only() {
        let filter = CostFilter::new(ymd(2024, 1, 1), ymd(2024, 12, 1)).with_service("Netflix");
        let query = build_total_cost_query(&filter);

        assert!(query.sql().ends_with("AND service_name = $3"));
        assert!(!query.sql().contains("user_id"));
    }
}
