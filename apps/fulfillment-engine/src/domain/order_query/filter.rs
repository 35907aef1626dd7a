//! Filter criteria for order views.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::order_management::{Order, OrderError, OrderStatus};
use crate::domain::shared::Timestamp;

/// Status criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "status")]
pub enum StatusFilter {
    /// Any status.
    #[default]
    All,
    /// Exactly this status.
    Only(OrderStatus),
}

impl StatusFilter {
    /// Returns true if `status` passes the filter.
    #[must_use]
    pub fn accepts(&self, status: OrderStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<OrderStatus>()
            .map(Self::Only)
            .map_err(|_| OrderError::invalid("status", format!("unknown status filter '{s}'")))
    }
}

/// Creation-date criterion, in whole UTC days ending on `as_of`'s day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    /// Any date.
    #[default]
    All,
    /// The UTC day containing `as_of`.
    Today,
    /// The last 7 UTC days, including today.
    Week,
    /// The last 30 UTC days, including today.
    Month,
}

impl DateRange {
    /// Closed-open `[start, end)` interval anchored on `as_of`, or `None`
    /// for [`DateRange::All`].
    #[must_use]
    pub fn bounds(&self, as_of: Timestamp) -> Option<(Timestamp, Timestamp)> {
        let days_back = match self {
            Self::All => return None,
            Self::Today => 0,
            Self::Week => 6,
            Self::Month => 29,
        };
        let midnight = as_of.start_of_day();
        Some((midnight.plus_days(-days_back), midnight.plus_days(1)))
    }

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(OrderError::invalid(
                "date_range",
                format!("unknown date range '{s}'"),
            )),
        }
    }
}

/// Criteria for selecting orders for display and aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Status criterion.
    pub status: StatusFilter,
    /// Creation-date criterion.
    pub date_range: DateRange,
    /// Case-insensitive substring of order number, customer name or email.
    pub search_term: String,
    /// Anchor for relative date ranges.
    pub as_of: Timestamp,
}

impl FilterSpec {
    /// A filter that matches every order.
    #[must_use]
    pub const fn all(as_of: Timestamp) -> Self {
        Self {
            status: StatusFilter::All,
            date_range: DateRange::All,
            search_term: String::new(),
            as_of,
        }
    }

    /// Build a filter from optional string parameters, as found in a query
    /// string. Missing parameters mean "all".
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` for an unknown status or date range.
    pub fn from_params(
        status: Option<&str>,
        date_range: Option<&str>,
        search: Option<&str>,
        as_of: Timestamp,
    ) -> Result<Self, OrderError> {
        Ok(Self {
            status: status.map_or(Ok(StatusFilter::All), str::parse)?,
            date_range: date_range.map_or(Ok(DateRange::All), str::parse)?,
            search_term: search.unwrap_or_default().to_string(),
            as_of,
        })
    }

    /// Set the status criterion.
    #[must_use]
    pub const fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    /// Set the date criterion.
    #[must_use]
    pub const fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    /// Set the search term.
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Returns true if `order` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        self.status.accepts(order.status())
            && self.matches_date(order.created_at())
            && self.matches_search(order)
    }

    fn matches_date(&self, created_at: Timestamp) -> bool {
        self.date_range
            .bounds(self.as_of)
            .is_none_or(|(start, end)| start <= created_at && created_at < end)
    }

    fn matches_search(&self, order: &Order) -> bool {
        let needle = self.search_term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let customer = order.customer();
        [
            order.order_number().as_str(),
            customer.name.as_str(),
            customer.email.as_str(),
        ]
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn today_bounds_are_utc_day() {
        let (start, end) = DateRange::Today
            .bounds(ts("2026-03-10T15:30:00Z"))
            .unwrap();
        assert_eq!(start, ts("2026-03-10T00:00:00Z"));
        assert_eq!(end, ts("2026-03-11T00:00:00Z"));
    }

    #[test]
    fn week_and_month_bounds() {
        let as_of = ts("2026-03-10T15:30:00Z");
        assert_eq!(
            DateRange::Week.bounds(as_of).unwrap().0,
            ts("2026-03-04T00:00:00Z")
        );
        assert_eq!(
            DateRange::Month.bounds(as_of).unwrap().0,
            ts("2026-02-09T00:00:00Z")
        );
        assert!(DateRange::All.bounds(as_of).is_none());
    }

    #[test]
    fn parse_params() {
        let as_of = ts("2026-03-10T00:00:00Z");
        let spec = FilterSpec::from_params(Some("shipped"), Some("week"), Some(" ada "), as_of)
            .unwrap();
        assert_eq!(spec.status, StatusFilter::Only(OrderStatus::Shipped));
        assert_eq!(spec.date_range, DateRange::Week);

        let all = FilterSpec::from_params(Some("all"), None, None, as_of).unwrap();
        assert_eq!(all, FilterSpec::all(as_of));
    }

    #[test]
    fn parse_rejects_unknown_values() {
        let as_of = ts("2026-03-10T00:00:00Z");
        let err = FilterSpec::from_params(Some("lost"), None, None, as_of).unwrap_err();
        assert!(matches!(err, OrderError::InvalidParameters { ref field, .. } if field == "status"));
        let err = FilterSpec::from_params(None, Some("year"), None, as_of).unwrap_err();
        assert!(matches!(err, OrderError::InvalidParameters { ref field, .. } if field == "date_range"));
    }

    #[test]
    fn status_filter_accepts() {
        assert!(StatusFilter::All.accepts(OrderStatus::Cancelled));
        assert!(StatusFilter::Only(OrderStatus::Paid).accepts(OrderStatus::Paid));
        assert!(!StatusFilter::Only(OrderStatus::Paid).accepts(OrderStatus::Pending));
    }
}
