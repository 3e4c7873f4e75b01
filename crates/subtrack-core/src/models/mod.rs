//! Domain models for Subtrack
//!
//! This module contains the core domain models used throughout the application.

pub mod month;
pub mod subscription;

pub use month::{
    first_of_month, format_month_year, last_day_of_month, parse_month_year, INVALID_MONTH_YEAR,
};
pub use subscription::{CostFilter, NewSubscription, Subscription, SubscriptionUpdate, TotalCost};
