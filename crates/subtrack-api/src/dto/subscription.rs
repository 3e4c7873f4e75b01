//! Subscription DTOs
//!
//! Request and response types for the subscription endpoints. Dates travel
//! as `"MM-YYYY"` strings and are parsed here, before anything reaches the
//! service layer.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use subtrack_core::models::{
    format_month_year, parse_month_year, CostFilter, NewSubscription, Subscription,
    SubscriptionUpdate, TotalCost,
};
use subtrack_core::{AppError, AppResult};
use uuid::Uuid;
use validator::Validate;

use super::common::INVALID_USER_ID_FORMAT;

/// Subscription creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSubscriptionRequest {
    #[validate(length(max = 255, message = "service_name is too long"))]
    pub service_name: String,

    #[validate(range(min = 0, message = "price should be >=0"))]
    pub price: i32,

    pub user_id: Uuid,

    /// First month, `"MM-YYYY"`
    pub start_date: String,

    /// Last month, `"MM-YYYY"`; absent for open-ended subscriptions
    #[serde(default)]
    pub end_date: Option<String>,
}

impl CreateSubscriptionRequest {
    /// Parse dates and build the domain input
    pub fn into_new_subscription(self) -> AppResult<NewSubscription> {
        let start_date = parse_month_year(&self.start_date)?;
        let end_date = self
            .end_date
            .as_deref()
            .map(parse_month_year)
            .transpose()?;

        Ok(NewSubscription::new(
            self.service_name,
            self.price,
            self.user_id,
            start_date,
            end_date,
        ))
    }
}

/// Partial update request; every field is optional
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSubscriptionRequest {
    #[validate(length(max = 255, message = "service_name is too long"))]
    pub service_name: Option<String>,

    #[validate(range(min = 0, message = "price should be >=0"))]
    pub price: Option<i32>,

    pub end_date: Option<String>,
}

impl UpdateSubscriptionRequest {
    pub fn into_update(self) -> AppResult<SubscriptionUpdate> {
        let end_date = self
            .end_date
            .as_deref()
            .map(parse_month_year)
            .transpose()?;

        Ok(SubscriptionUpdate {
            service_name: self.service_name,
            price: self.price,
            end_date,
        })
    }
}

/// Cost query string
///
/// All fields are raw so that missing and malformed values produce the same
/// messages. Empty `user_id` or `service_name` means no filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CostQuery {
    pub start_period: Option<String>,
    pub end_period: Option<String>,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

impl CostQuery {
    pub fn into_filter(self) -> AppResult<CostFilter> {
        let start = parse_month_year(self.start_period.as_deref().unwrap_or_default())?;
        let end = parse_month_year(self.end_period.as_deref().unwrap_or_default())?;
        let mut filter = CostFilter::new(start, end);

        if let Some(raw) = self.user_id.as_deref().filter(|s| !s.is_empty()) {
            let user_id = Uuid::parse_str(raw)
                .map_err(|_| AppError::InvalidInput(INVALID_USER_ID_FORMAT.to_string()))?;
            filter = filter.with_user(user_id);
        }
        if let Some(service_name) = self.service_name.filter(|s| !s.is_empty()) {
            filter = filter.with_service(service_name);
        }

        Ok(filter)
    }
}

/// Subscription response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub created_at: String,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id,
            service_name: s.service_name,
            price: s.price,
            user_id: s.user_id,
            start_date: format_month_year(s.start_date),
            end_date: s.end_date.map(format_month_year),
            created_at: s.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Body of both list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionListResponse {
    pub subscriptions: Vec<SubscriptionResponse>,
}

impl From<Vec<Subscription>> for SubscriptionListResponse {
    fn from(subscriptions: Vec<Subscription>) -> Self {
        Self {
            subscriptions: subscriptions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Cost aggregation response
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TotalCostResponse {
    pub total_cost: i64,
    pub count: i64,
}

impl From<TotalCost> for TotalCostResponse {
    fn from(t: TotalCost) -> Self {
        Self {
            total_cost: t.total_cost,
            count: t.count,
        }
    }
}
