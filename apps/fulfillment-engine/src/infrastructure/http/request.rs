//! HTTP request types that are not application DTOs.

use serde::{Deserialize, Serialize};

use crate::application::dto::LineItemInputDto;
use crate::domain::order_management::{LineItem, OrderError};
use crate::domain::order_query::FilterSpec;
use crate::domain::shared::Timestamp;

/// Query string of `GET /api/v1/orders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQueryParams {
    /// `all` or a status name.
    pub status: Option<String>,
    /// `all`, `today`, `week` or `month`.
    pub date_range: Option<String>,
    /// Substring of order number, customer name or email.
    pub search: Option<String>,
    /// RFC 3339 anchor for date ranges; defaults to the request time.
    pub as_of: Option<String>,
}

impl OrderQueryParams {
    /// Build a filter, anchoring date ranges at `as_of` or `now`.
    pub fn to_filter(&self, now: Timestamp) -> Result<FilterSpec, OrderError> {
        let as_of = match self.as_of.as_deref() {
            Some(raw) => Timestamp::parse(raw)
                .map_err(|e| OrderError::invalid("as_of", format!("'{raw}': {e}")))?,
            None => now,
        };
        FilterSpec::from_params(
            self.status.as_deref(),
            self.date_range.as_deref(),
            self.search.as_deref(),
            as_of,
        )
    }
}

/// Body of `PATCH /api/v1/orders/{id}/notes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateNotesRequest {
    /// Replacement notes.
    pub notes: String,
}

/// Body of `PUT /api/v1/orders/{id}/items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceItemsRequest {
    /// Replacement items, at least one.
    pub items: Vec<LineItemInputDto>,
}

impl ReplaceItemsRequest {
    /// Convert to domain line items.
    pub fn to_domain(&self) -> Result<Vec<LineItem>, OrderError> {
        self.items.iter().map(LineItemInputDto::to_domain).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_query::{DateRange, StatusFilter};
    use crate::domain::order_management::OrderStatus;

    #[test]
    fn empty_params_match_everything() {
        let now = Timestamp::parse("2026-03-01T10:00:00Z").unwrap();
        let filter = OrderQueryParams::default().to_filter(now).unwrap();
        assert_eq!(filter.status, StatusFilter::All);
        assert_eq!(filter.date_range, DateRange::All);
        assert_eq!(filter.as_of, now);
    }

    #[test]
    fn explicit_anchor_wins() {
        let params = OrderQueryParams {
            status: Some("shipped".to_string()),
            date_range: Some("week".to_string()),
            search: None,
            as_of: Some("2026-02-01T00:00:00Z".to_string()),
        };
        let filter = params.to_filter(Timestamp::now()).unwrap();
        assert_eq!(filter.status, StatusFilter::Only(OrderStatus::Shipped));
        assert_eq!(
            filter.as_of,
            Timestamp::parse("2026-02-01T00:00:00Z").unwrap()
        );
    }

    #[test]
    fn bad_anchor_is_invalid() {
        let params = OrderQueryParams {
            as_of: Some("yesterday".to_string()),
            ..OrderQueryParams::default()
        };
        assert!(matches!(
            params.to_filter(Timestamp::now()),
            Err(OrderError::InvalidParameters { .. })
        ));
    }
}
