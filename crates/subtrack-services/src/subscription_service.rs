//! Subscription service implementation
//!
//! Orchestrates repository calls for the subscription use cases, maps missing
//! records and storage failures onto [`ServiceError`], and logs each operation
//! within its own span.

use std::sync::Arc;
use std::time::Instant;

use subtrack_core::{
    models::{CostFilter, NewSubscription, Subscription, SubscriptionUpdate, TotalCost},
    traits::{ListParams, SubscriptionRepository},
    AppError,
};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::error::ServiceError;

/// Subscription use cases
#[derive(Clone)]
pub struct SubscriptionService {
    repo: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionService {
    /// Create a new subscription service
    pub fn new(repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repo }
    }

    /// Log a repository failure and translate it
    fn map_error(err: AppError) -> ServiceError {
        error!(code = err.error_code(), error = %err, "Repository call failed");
        ServiceError::from(err)
    }

    #[instrument(
        skip(self, input),
        fields(op = "service.create_subscription", user_id = %input.user_id)
    )]
    pub async fn create_subscription(
        &self,
        input: NewSubscription,
    ) -> Result<Subscription, ServiceError> {
        debug!("Process started");

        let subscription = self.repo.create(&input).await.map_err(Self::map_error)?;

        info!(id = subscription.id, "Subscription created");
        Ok(subscription)
    }

    #[instrument(skip(self), fields(op = "service.get_subscription"))]
    pub async fn get_subscription(&self, id: i64) -> Result<Subscription, ServiceError> {
        debug!("Process started");

        let subscription = self
            .repo
            .find_by_id(id)
            .await
            .map_err(Self::map_error)?
            .ok_or(ServiceError::NotFound)?;

        debug!("Success");
        Ok(subscription)
    }

    #[instrument(
        skip(self),
        fields(op = "service.list_subscriptions", limit = params.limit, offset = params.offset)
    )]
    pub async fn list_subscriptions(
        &self,
        params: ListParams,
    ) -> Result<Vec<Subscription>, ServiceError> {
        let start = Instant::now();
        debug!("Process started");

        let subscriptions = self.repo.list(params).await.map_err(Self::map_error)?;

        info!(
            count = subscriptions.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Success"
        );
        Ok(subscriptions)
    }

    #[instrument(
        skip(self),
        fields(
            op = "service.list_user_subscriptions",
            user_id = %user_id,
            limit = params.limit,
            offset = params.offset
        )
    )]
    pub async fn list_user_subscriptions(
        &self,
        user_id: Uuid,
        params: ListParams,
    ) -> Result<Vec<Subscription>, ServiceError> {
        let start = Instant::now();
        debug!("Process started");

        let subscriptions = self
            .repo
            .list_by_user(user_id, params)
            .await
            .map_err(Self::map_error)?;

        info!(
            count = subscriptions.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Success"
        );
        Ok(subscriptions)
    }

    /// Apply a partial update; an empty update returns the record unchanged
    #[instrument(skip(self, changes), fields(op = "service.update_subscription"))]
    pub async fn update_subscription(
        &self,
        id: i64,
        changes: SubscriptionUpdate,
    ) -> Result<Subscription, ServiceError> {
        debug!(empty = changes.is_empty(), "Process started");

        let subscription = self
            .repo
            .update(id, &changes)
            .await
            .map_err(Self::map_error)?
            .ok_or(ServiceError::NotFound)?;

        info!("Subscription updated");
        Ok(subscription)
    }

    #[instrument(skip(self), fields(op = "service.delete_subscription"))]
    pub async fn delete_subscription(&self, id: i64) -> Result<(), ServiceError> {
        debug!("Process started");

        let deleted = self.repo.delete(id).await.map_err(Self::map_error)?;
        if !deleted {
            return Err(ServiceError::NotFound);
        }

        info!("Subscription deleted");
        Ok(())
    }

    #[instrument(
        skip(self, filter),
        fields(
            op = "service.calculate_total_cost",
            start = %filter.start_period,
            end = %filter.end_period,
            user_id = ?filter.user_id,
            service_name = ?filter.service_name
        )
    )]
    pub async fn calculate_total_cost(
        &self,
        filter: CostFilter,
    ) -> Result<TotalCost, ServiceError> {
        let start = Instant::now();
        debug!("Process started");

        let total = self
            .repo
            .total_cost(&filter)
            .await
            .map_err(Self::map_error)?;

        debug!(
            total_cost = total.total_cost,
            count = total.count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Success"
        );
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use subtrack_db::InMemorySubscriptionRepository;

    /// Repository whose every call fails like a lost connection
    struct FailingRepository;

    #[async_trait]
    impl SubscriptionRepository for FailingRepository {
        async fn create(&self, _input: &NewSubscription) -> Result<Subscription, AppError> {
            Err(AppError::Database("connection refused".to_string()))
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<Subscription>, AppError> {
            Err(AppError::Database("connection refused".to_string()))
        }

        async fn list(&self, _params: ListParams) -> Result<Vec<Subscription>, AppError> {
            Err(AppError::Pool("pool timed out".to_string()))
        }

        async fn list_by_user(
            &self,
            _user_id: Uuid,
            _params: ListParams,
        ) -> Result<Vec<Subscription>, AppError> {
            Err(AppError::Pool("pool timed out".to_string()))
        }

        async fn update(
            &self,
            _id: i64,
            _changes: &SubscriptionUpdate,
        ) -> Result<Option<Subscription>, AppError> {
            Err(AppError::Database("connection refused".to_string()))
        }

        async fn delete(&self, _id: i64) -> Result<bool, AppError> {
            Err(AppError::Database("connection refused".to_string()))
        }

        async fn total_cost(&self, _filter: &CostFilter) -> Result<TotalCost, AppError> {
            Err(AppError::Database("connection refused".to_string()))
        }
    }

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn service() -> SubscriptionService {
        SubscriptionService::new(Arc::new(InMemorySubscriptionRepository::new()))
    }

    #[tokio::test]
    async fn test_create_assigns_unique_positive_ids() {
        let service = service();
        let user = Uuid::new_v4();

        let first = service
            .create_subscription(NewSubscription::new("Netflix", 999, user, ymd(2024, 1), None))
            .await
            .unwrap();
        let second = service
            .create_subscription(NewSubscription::new("Netflix", 999, user, ymd(2024, 1), None))
            .await
            .unwrap();

        assert!(first.id > 0);
        assert_ne!(first.id, second.id);
        assert!(second.created_at >= first.created_at);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let err = service().get_subscription(99999).await.unwrap_err();
        assert_eq!(err, ServiceError::NotFound);
    }

    #[tokio::test]
    async fn test_empty_update_returns_record_unchanged() {
        let service = service();
        let created = service
            .create_subscription(NewSubscription::new(
                "Spotify",
                169,
                Uuid::new_v4(),
                ymd(2024, 1),
                Some(ymd(2024, 12)),
            ))
            .await
            .unwrap();

        let updated = service
            .update_subscription(created.id, SubscriptionUpdate::default())
            .await
            .unwrap();

        assert_eq!(updated, created);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let err = service()
            .update_subscription(7, SubscriptionUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::NotFound);
    }

    #[tokio::test]
    async fn test_delete_then_get_not_found() {
        let service = service();
        let created = service
            .create_subscription(NewSubscription::new(
                "Okko",
                399,
                Uuid::new_v4(),
                ymd(2024, 1),
                None,
            ))
            .await
            .unwrap();

        service.delete_subscription(created.id).await.unwrap();

        assert_eq!(
            service.delete_subscription(created.id).await.unwrap_err(),
            ServiceError::NotFound
        );
        assert_eq!(
            service.get_subscription(created.id).await.unwrap_err(),
            ServiceError::NotFound
        );
    }

    #[tokio::test]
    async fn test_total_cost_with_no_matches_is_zero() {
        let total = service()
            .calculate_total_cost(CostFilter::new(ymd(2024, 1), ymd(2024, 12)))
            .await
            .unwrap();

        assert_eq!(total, TotalCost { total_cost: 0, count: 0 });
    }

    #[tokio::test]
    async fn test_total_cost_filters_intersect() {
        let service = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        for (name, price, user) in [
            ("Netflix", 500, alice),
            ("Spotify", 200, alice),
            ("Netflix", 700, bob),
        ] {
            service
                .create_subscription(NewSubscription::new(name, price, user, ymd(2024, 1), None))
                .await
                .unwrap();
        }

        let total = service
            .calculate_total_cost(
                CostFilter::new(ymd(2024, 6), ymd(2024, 12))
                    .with_user(alice)
                    .with_service("Netflix"),
            )
            .await
            .unwrap();
        assert_eq!(total, TotalCost { total_cost: 500, count: 1 });

        let everyone = service
            .calculate_total_cost(CostFilter::new(ymd(2024, 6), ymd(2024, 12)))
            .await
            .unwrap();
        assert_eq!(everyone, TotalCost { total_cost: 1400, count: 3 });
    }

    #[tokio::test]
    async fn test_storage_failures_are_internal() {
        let service = SubscriptionService::new(Arc::new(FailingRepository));

        assert_eq!(
            service.get_subscription(1).await.unwrap_err(),
            ServiceError::Internal
        );
        assert_eq!(
            service
                .list_subscriptions(ListParams::default())
                .await
                .unwrap_err(),
            ServiceError::Internal
        );
        assert_eq!(
            service.delete_subscription(1).await.unwrap_err(),
            ServiceError::Internal
        );
        assert_eq!(
            service
                .calculate_total_cost(CostFilter::new(ymd(2024, 1), ymd(2024, 1)))
                .await
                .unwrap_err(),
            ServiceError::Internal
        );
    }
}
