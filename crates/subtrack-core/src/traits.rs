//! Common traits for repositories
//!
//! Defines the persistence abstraction consumed by the service layer.

use crate::error::AppError;
use crate::models::{CostFilter, NewSubscription, Subscription, SubscriptionUpdate, TotalCost};
use async_trait::async_trait;
use uuid::Uuid;

/// Subscription repository
///
/// Lookups report absence with `None`/`false`; errors are reserved for
/// storage failures.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a subscription and return the stored record
    async fn create(&self, input: &NewSubscription) -> Result<Subscription, AppError>;

    /// Find subscription by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Subscription>, AppError>;

    /// List subscriptions, newest first
    async fn list(&self, params: ListParams) -> Result<Vec<Subscription>, AppError>;

    /// List one user's subscriptions, newest first
    async fn list_by_user(
        &self,
        user_id: Uuid,
        params: ListParams,
    ) -> Result<Vec<Subscription>, AppError>;

    /// Apply a partial update; `None` if the subscription does not exist
    async fn update(
        &self,
        id: i64,
        changes: &SubscriptionUpdate,
    ) -> Result<Option<Subscription>, AppError>;

    /// Delete subscription by ID; `false` if nothing was deleted
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Sum prices and count subscriptions overlapping the filter's period
    async fn total_cost(&self, filter: &CostFilter) -> Result<TotalCost, AppError>;
}

/// Default page size for list endpoints
pub const DEFAULT_LIST_LIMIT: i64 = 10;

/// Largest page size a client may request
pub const MAX_LIST_LIMIT: i64 = 100;

/// Limit/offset pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    pub limit: i64,
    pub offset: i64,
}

impl ListParams {
    /// Clamp raw values: non-positive limit becomes the default, large limits
    /// are capped, negative offsets become zero.
    pub fn new(limit: i64, offset: i64) -> Self {
        let limit = if limit <= 0 {
            DEFAULT_LIST_LIMIT
        } else {
            limit.min(MAX_LIST_LIMIT)
        };

        Self {
            limit,
            offset: offset.max(0),
        }
    }

    /// Build from raw query strings; anything unparseable falls back to defaults
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> Self {
        let parse = |v: Option<&str>| v.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0);
        Self::new(parse(limit), parse(offset))
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self::new(DEFAULT_LIST_LIMIT, 0)
    }
}
