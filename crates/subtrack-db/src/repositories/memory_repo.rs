//! In-memory subscription repository
//!
//! Mirrors the PostgreSQL repository's semantics (id assignment, newest-first
//! ordering, overlap rule) without a database. Used by tests and local runs.

use async_trait::async_trait;
use chrono::Utc;
use subtrack_core::{
    models::{CostFilter, NewSubscription, Subscription, SubscriptionUpdate, TotalCost},
    traits::{ListParams, SubscriptionRepository},
    AppResult,
};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Store {
    next_id: i64,
    rows: Vec<Subscription>,
}

/// Subscription repository backed by a `Vec` behind an async lock
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    store: RwLock<Store>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn page(mut rows: Vec<Subscription>, params: ListParams) -> Vec<Subscription> {
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.into_iter()
            .skip(params.offset as usize)
            .take(params.limit as usize)
            .collect()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(&self, input: &NewSubscription) -> AppResult<Subscription> {
        let mut store = self.store.write().await;
        store.next_id += 1;

        // Keep created_at monotonic even if the clock steps back
        let now = Utc::now();
        let created_at = store
            .rows
            .iter()
            .map(|s| s.created_at)
            .max()
            .map_or(now, |last| last.max(now));

        let subscription = Subscription {
            id: store.next_id,
            service_name: input.service_name.clone(),
            price: input.price,
            user_id: input.user_id,
            start_date: input.start_date,
            end_date: input.end_date,
            created_at,
        };
        store.rows.push(subscription.clone());

        Ok(subscription)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Subscription>> {
        let store = self.store.read().await;
        Ok(store.rows.iter().find(|s| s.id == id).cloned())
    }

    async fn list(&self, params: ListParams) -> AppResult<Vec<Subscription>> {
        let store = self.store.read().await;
        Ok(Self::page(store.rows.clone(), params))
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        params: ListParams,
    ) -> AppResult<Vec<Subscription>> {
        let store = self.store.read().await;
        let rows = store
            .rows
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        Ok(Self::page(rows, params))
    }

    async fn update(
        &self,
        id: i64,
        changes: &SubscriptionUpdate,
    ) -> AppResult<Option<Subscription>> {
        let mut store = self.store.write().await;
        Ok(store.rows.iter_mut().find(|s| s.id == id).map(|s| {
            changes.apply_to(s);
            s.clone()
        }))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut store = self.store.write().await;
        let before = store.rows.len();
        store.rows.retain(|s| s.id != id);
        Ok(store.rows.len() < before)
    }

    async fn total_cost(&self, filter: &CostFilter) -> AppResult<TotalCost> {
        let store = self.store.read().await;
        Ok(TotalCost::from_matches(filter, &store.rows))
    }
}
