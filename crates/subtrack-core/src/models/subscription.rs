//! Subscription model
//!
//! A subscription is a user's recurring payment for a named service,
//! valid from a start month until an optional end month.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::month::{first_of_month, last_day_of_month};

/// Subscription entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Server-assigned identifier
    pub id: i64,

    /// Name of the subscribed service (e.g., "Yandex Plus")
    pub service_name: String,

    /// Monthly price in minor currency units
    pub price: i32,

    /// Owning user
    pub user_id: Uuid,

    /// First month of validity (always the 1st of the month)
    pub start_date: NaiveDate,

    /// Last month of validity; `None` means open-ended
    pub end_date: Option<NaiveDate>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Whether the subscription has no end date
    pub fn is_open_ended(&self) -> bool {
        self.end_date.is_none()
    }

    /// Whether the subscription's validity intersects `[from, through]`
    ///
    /// Both bounds are inclusive. A missing end date never ends.
    pub fn overlaps(&self, from: NaiveDate, through: NaiveDate) -> bool {
        self.start_date <= through && self.end_date.map_or(true, |end| end >= from)
    }
}

/// Input for creating a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl NewSubscription {
    pub fn new(
        service_name: impl Into<String>,
        price: i32,
        user_id: Uuid,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            price,
            user_id,
            start_date: first_of_month(start_date),
            end_date: end_date.map(first_of_month),
        }
    }
}

/// Partial update of a subscription
///
/// Only fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionUpdate {
    pub service_name: Option<String>,
    pub price: Option<i32>,
    pub end_date: Option<NaiveDate>,
}

impl SubscriptionUpdate {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.service_name.is_none() && self.price.is_none() && self.end_date.is_none()
    }

    /// Apply the supplied fields to an existing record
    pub fn apply_to(&self, subscription: &mut Subscription) {
        if let Some(name) = &self.service_name {
            subscription.service_name = name.clone();
        }
        if let Some(price) = self.price {
            subscription.price = price;
        }
        if let Some(end) = self.end_date {
            subscription.end_date = Some(first_of_month(end));
        }
    }
}

/// Parameters of a cost aggregation query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostFilter {
    /// First month of the period
    pub start_period: NaiveDate,

    /// Last month of the period (inclusive through its last day)
    pub end_period: NaiveDate,

    /// Restrict to one user
    pub user_id: Option<Uuid>,

    /// Restrict to one service (exact, case-sensitive)
    pub service_name: Option<String>,
}

impl CostFilter {
    pub fn new(start_period: NaiveDate, end_period: NaiveDate) -> Self {
        Self {
            start_period: first_of_month(start_period),
            end_period: first_of_month(end_period),
            user_id: None,
            service_name: None,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_service(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    /// Last calendar day covered by the period
    pub fn period_end(&self) -> NaiveDate {
        last_day_of_month(self.end_period)
    }

    /// Whether a subscription contributes to this query
    pub fn matches(&self, subscription: &Subscription) -> bool {
        if let Some(user_id) = self.user_id {
            if subscription.user_id != user_id {
                return false;
            }
        }
        if let Some(service_name) = &self.service_name {
            if &subscription.service_name != service_name {
                return false;
            }
        }
        subscription.overlaps(self.start_period, self.period_end())
    }
}

/// Aggregated cost over a period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalCost {
    /// Sum of matching prices
    pub total_cost: i64,

    /// Number of matching subscriptions
    pub count: i64,
}

impl TotalCost {
    /// Fold matching subscriptions into a total
    pub fn from_matches<'a>(
        filter: &CostFilter,
        subscriptions: impl IntoIterator<Item = &'a Subscription>,
    ) -> Self {
        subscriptions
            .into_iter()
            .filter(|s| filter.matches(s))
            .fold(Self::default(), |acc, s| Self {
                total_cost: acc.total_cost + i64::from(s.price),
                count: acc.count + 1,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_subscription(
        service_name: &str,
        price: i32,
        user_id: Uuid,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Subscription {
        Subscription {
            id: 1,
            service_name: service_name.to_string(),
            price,
            user_id,
            start_date: start,
            end_date: end,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_ended_overlaps_later_period() {
        let sub = create_test_subscription("Netflix", 999, Uuid::new_v4(), ymd(2024, 1, 1), None);
        let filter = CostFilter::new(ymd(2024, 6, 1), ymd(2024, 12, 1));

        assert!(sub.is_open_ended());
        assert!(filter.matches(&sub));
    }

    #[test]
    fn test_ended_subscription_excluded_from_later_period() {
        let sub = create_test_subscription(
            "Netflix",
            999,
            Uuid::new_v4(),
            ymd(2024, 1, 1),
            Some(ymd(2024, 12, 1)),
        );
        let filter = CostFilter::new(ymd(2025, 1, 1), ymd(2025, 12, 1));

        assert!(!filter.matches(&sub));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let user = Uuid::new_v4();
        let filter = CostFilter::new(ymd(2024, 3, 1), ymd(2024, 5, 1));

        // Starts on the last day of the end month
        let late = create_test_subscription("A", 100, user, ymd(2024, 5, 31), None);
        assert!(filter.matches(&late));

        // Ends exactly at the start of the period
        let early =
            create_test_subscription("B", 100, user, ymd(2023, 1, 1), Some(ymd(2024, 3, 1)));
        assert!(filter.matches(&early));

        // Starts the month after
        let after = create_test_subscription("C", 100, user, ymd(2024, 6, 1), None);
        assert!(!filter.matches(&after));
    }

    #[test]
    fn test_single_month_window() {
        let filter = CostFilter::new(ymd(2024, 2, 1), ymd(2024, 2, 1));
        assert_eq!(filter.period_end(), ymd(2024, 2, 29));

        let sub = create_test_subscription(
            "A",
            100,
            Uuid::new_v4(),
            ymd(2024, 2, 1),
            Some(ymd(2024, 2, 1)),
        );
        assert!(filter.matches(&sub));
    }

    #[test]
    fn test_filters_intersect() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let start = ymd(2024, 1, 1);
        let subs = vec![
            create_test_subscription("Netflix", 500, alice, start, None),
            create_test_subscription("Spotify", 200, alice, start, None),
            create_test_subscription("Netflix", 700, bob, start, None),
        ];

        let filter = CostFilter::new(start, start)
            .with_user(alice)
            .with_service("Netflix");
        let total = TotalCost::from_matches(&filter, &subs);

        assert_eq!(total, TotalCost { total_cost: 500, count: 1 });
    }

    #[test]
    fn test_service_filter_is_case_sensitive() {
        let start = ymd(2024, 1, 1);
        let sub = create_test_subscription("Netflix", 500, Uuid::new_v4(), start, None);
        let filter = CostFilter::new(start, start).with_service("netflix");

        assert!(!filter.matches(&sub));
    }

    #[test]
    fn test_empty_match_is_zero() {
        let filter = CostFilter::new(ymd(2024, 1, 1), ymd(2024, 12, 1));
        assert_eq!(
            TotalCost::from_matches(&filter, &Vec::<Subscription>::new()),
            TotalCost::default()
        );
    }

    #[test]
    fn test_update_is_empty_and_apply() {
        assert!(SubscriptionUpdate::default().is_empty());

        let mut sub =
            create_test_subscription("Netflix", 500, Uuid::new_v4(), ymd(2024, 1, 1), None);
        let before = sub.clone();
        SubscriptionUpdate::default().apply_to(&mut sub);
        assert_eq!(sub, before);

        let update = SubscriptionUpdate {
            price: Some(800),
            end_date: Some(ymd(2024, 12, 15)),
            ..Default::default()
        };
        assert!(!update.is_empty());
        update.apply_to(&mut sub);
        assert_eq!(sub.price, 800);
        assert_eq!(sub.end_date, Some(ymd(2024, 12, 1)));
        assert_eq!(sub.service_name, "Netflix");
    }

    #[test]
    fn test_new_subscription_normalizes_dates() {
        let input = NewSubscription::new(
            "Netflix",
            100,
            Uuid::new_v4(),
            ymd(2024, 3, 9),
            Some(ymd(2024, 9, 30)),
        );
        assert_eq!(input.start_date, ymd(2024, 3, 1));
        assert_eq!(input.end_date, Some(ymd(2024, 9, 1)));
    }
}
