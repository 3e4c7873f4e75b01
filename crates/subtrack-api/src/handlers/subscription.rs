//! Subscription handlers
//!
//! HTTP handlers for subscription management and cost endpoints.

use crate::dto::{
    CostQuery, CreateSubscriptionRequest, ListQuery, SubscriptionListResponse,
    SubscriptionResponse, TotalCostResponse, UpdateSubscriptionRequest, INVALID_BODY,
    INVALID_ID, INVALID_ID_FORMAT, INVALID_USER_ID_FORMAT,
};
use actix_web::{web, HttpResponse};
use subtrack_core::AppError;
use subtrack_services::SubscriptionService;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Parse a subscription id from a path segment
///
/// Only the format is checked; an id that cannot exist is reported as not
/// found by the service.
pub(crate) fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::InvalidInput(INVALID_ID_FORMAT.to_string()))
}

/// Parse an id that must also be positive
pub(crate) fn parse_positive_id(raw: &str) -> Result<i64, AppError> {
    let id = parse_id(raw)?;

    if id <= 0 {
        return Err(AppError::InvalidInput(INVALID_ID.to_string()));
    }

    Ok(id)
}

pub(crate) fn parse_user_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput(INVALID_USER_ID_FORMAT.to_string()))
}

/// Create a subscription
///
/// POST /subscriptions
#[instrument(skip(service, req), fields(op = "handler.create_subscription"))]
pub async fn create_subscription(
    service: web::Data<SubscriptionService>,
    req: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Subscription creation validation failed: {}", e);
        AppError::from(e)
    })?;

    let input = req.into_inner().into_new_subscription().map_err(|e| {
        warn!("Subscription creation rejected: {}", e);
        e
    })?;

    debug!(service_name = %input.service_name, user_id = %input.user_id, "Creating subscription");

    let created = service.create_subscription(input).await?;

    info!(id = created.id, "Subscription created successfully");

    Ok(HttpResponse::Created().json(SubscriptionResponse::from(created)))
}

/// Get a subscription by id
///
/// GET /subscriptions/{id}
#[instrument(skip(service), fields(op = "handler.get_subscription"))]
pub async fn get_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_positive_id(&path)?;
    debug!(id, "Getting subscription");

    let subscription = service.get_subscription(id).await?;

    Ok(HttpResponse::Ok().json(SubscriptionResponse::from(subscription)))
}

/// List subscriptions, newest first
///
/// GET /subscriptions?limit=&offset=
#[instrument(skip(service), fields(op = "handler.list_subscriptions"))]
pub async fn list_subscriptions(
    service: web::Data<SubscriptionService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let params = query.params();
    debug!(limit = params.limit, offset = params.offset, "Listing subscriptions");

    let subscriptions = service.list_subscriptions(params).await?;

    Ok(HttpResponse::Ok().json(SubscriptionListResponse::from(subscriptions)))
}

/// List one user's subscriptions, newest first
///
/// GET /users/{user_id}/subscriptions?limit=&offset=
#[instrument(skip(service), fields(op = "handler.list_user_subscriptions"))]
pub async fn list_user_subscriptions(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = parse_user_id(&path)?;
    let params = query.params();
    debug!(%user_id, limit = params.limit, offset = params.offset, "Listing user subscriptions");

    let subscriptions = service.list_user_subscriptions(user_id, params).await?;

    Ok(HttpResponse::Ok().json(SubscriptionListResponse::from(subscriptions)))
}

/// Partially update a subscription
///
/// PATCH /subscriptions/{id}
#[instrument(skip(service, req), fields(op = "handler.update_subscription"))]
pub async fn update_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
    req: Result<web::Json<UpdateSubscriptionRequest>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    // The id is checked before the body so a bad path wins over a bad body
    let id = parse_id(&path)?;
    let req = req.map_err(|_| AppError::InvalidInput(INVALID_BODY.to_string()))?;

    req.validate().map_err(|e| {
        warn!("Subscription update validation failed: {}", e);
        AppError::from(e)
    })?;

    let changes = req.into_inner().into_update()?;
    debug!(id, empty = changes.is_empty(), "Updating subscription");

    let updated = service.update_subscription(id, changes).await?;

    info!(id, "Subscription updated successfully");

    Ok(HttpResponse::Ok().json(SubscriptionResponse::from(updated)))
}

/// Delete a subscription
///
/// DELETE /subscriptions/{id}
#[instrument(skip(service), fields(op = "handler.delete_subscription"))]
pub async fn delete_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path)?;
    debug!(id, "Deleting subscription");

    service.delete_subscription(id).await?;

    info!(id, "Subscription deleted successfully");

    Ok(HttpResponse::NoContent().finish())
}

/// Total monthly price of subscriptions active in a period
///
/// GET /subscriptions/cost?start_period=MM-YYYY&end_period=MM-YYYY[&user_id=][&service_name=]
#[instrument(skip(service), fields(op = "handler.calculate_total_cost"))]
pub async fn calculate_total_cost(
    service: web::Data<SubscriptionService>,
    query: web::Query<CostQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = query.into_inner().into_filter().map_err(|e| {
        warn!("Cost query rejected: {}", e);
        e
    })?;

    let total = service.calculate_total_cost(filter).await?;

    Ok(HttpResponse::Ok().json(TotalCostResponse::from(total)))
}

/// Configure subscription routes
///
/// `/subscriptions/cost` is registered before `/subscriptions/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::post().to(create_subscription))
            .route("", web::get().to(list_subscriptions))
            .route("/cost", web::get().to(calculate_total_cost))
            .route("/{id}", web::get().to(get_subscription))
            .route("/{id}", web::patch().to(update_subscription))
            .route("/{id}", web::delete().to(delete_subscription)),
    )
    .route(
        "/users/{user_id}/subscriptions",
        web::get().to(list_user_subscriptions),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("0").unwrap(), 0);
        assert_eq!(parse_id("-3").unwrap(), -3);
        assert_eq!(parse_id("abc").unwrap_err().public_message(), "invalid id format");
        assert_eq!(parse_id("1.5").unwrap_err().public_message(), "invalid id format");
    }

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id("42").unwrap(), 42);
        assert_eq!(
            parse_positive_id("abc").unwrap_err().public_message(),
            "invalid id format"
        );
        assert_eq!(
            parse_positive_id("0").unwrap_err().public_message(),
            "id should be > 0"
        );
        assert_eq!(
            parse_positive_id("-3").unwrap_err().public_message(),
            "id should be > 0"
        );
    }

    #[test]
    fn test_parse_user_id() {
        let user = Uuid::new_v4();
        assert_eq!(parse_user_id(&user.to_string()).unwrap(), user);
        assert_eq!(
            parse_user_id("12345").unwrap_err().public_message(),
            "invalid user_id format"
        );
    }
}
