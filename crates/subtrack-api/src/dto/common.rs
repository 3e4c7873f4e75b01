//! Common DTOs used across the API

use serde::{Deserialize, Serialize};
use subtrack_core::traits::ListParams;

/// Malformed or undecodable JSON body
pub const INVALID_BODY: &str = "invalid request body";

/// Query string that could not be decoded
pub const INVALID_QUERY: &str = "invalid query parameters";

/// Path id that is not an integer
pub const INVALID_ID_FORMAT: &str = "invalid id format";

/// Path id that is zero or negative
pub const INVALID_ID: &str = "id should be > 0";

/// Path or query user id that is not a UUID
pub const INVALID_USER_ID_FORMAT: &str = "invalid user_id format";

/// Liveness check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Pagination query parameters
///
/// Kept as raw strings: a value that does not parse falls back to the
/// default instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListQuery {
    /// Clamp into repository list parameters
    pub fn params(&self) -> ListParams {
        ListParams::from_query(self.limit.as_deref(), self.offset.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<&str>, offset: Option<&str>) -> ListQuery {
        ListQuery {
            limit: limit.map(str::to_string),
            offset: offset.map(str::to_string),
        }
    }

    #[test]
    fn test_list_query_defaults() {
        let params = ListQuery::default().params();
        assert_eq!(params.limit, 10);
        assert_eq!(params.offset, 0);
    }

    #[test]
    fn test_list_query_clamps() {
        assert_eq!(query(Some("200"), None).params().limit, 100);
        assert_eq!(query(Some("0"), None).params().limit, 10);
        assert_eq!(query(Some("-5"), None).params().limit, 10);
        assert_eq!(query(Some("abc"), Some("x")).params().limit, 10);
        assert_eq!(query(Some("25"), Some("-3")).params().offset, 0);
        assert_eq!(query(Some("25"), Some("40")).params().offset, 40);
    }

    #[test]
    fn test_health_response() {
        let health = HealthResponse::healthy();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.service, "subtrack-api");
    }
}
