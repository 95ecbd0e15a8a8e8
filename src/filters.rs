//! Filter engine
//!
//! Pure functions from raw rows to filtered copies. The source tables are
//! never mutated; every recomputation starts from the full snapshot.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::models::{GeoOrder, OrderReview, StatusFilter};

/// Filter parameters for the order-review table
#[derive(Debug, Clone)]
pub struct ReviewFilter {
    /// Inclusive day-granularity bounds; `None` disables the date filter
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub score_range: (u8, u8),
    pub delivery_range: (f64, f64),
    pub status: StatusFilter,
}

impl Default for ReviewFilter {
    fn default() -> Self {
        Self {
            date_range: None,
            score_range: (1, 5),
            delivery_range: (0.0, 60.0),
            status: StatusFilter::All,
        }
    }
}

/// Filter parameters for the geo table
#[derive(Debug, Clone)]
pub struct GeoFilter {
    /// Membership set; an empty set selects nothing
    pub states: HashSet<String>,
    pub status: StatusFilter,
    pub delivery_range: (f64, f64),
}

impl GeoFilter {
    pub fn all_states(states: impl IntoIterator<Item = String>) -> Self {
        Self {
            states: states.into_iter().collect(),
            status: StatusFilter::All,
            delivery_range: (0.0, 60.0),
        }
    }
}

/// Apply all active review predicates conjunctively.
///
/// Rows without a purchase timestamp pass the date filter; the table was
/// loaded without that column and the filter degrades to a no-op for them.
pub fn filter_reviews(rows: &[OrderReview], filter: &ReviewFilter) -> Vec<OrderReview> {
    rows.iter()
        .filter(|r| {
            if let (Some((start, end)), Some(date)) = (filter.date_range, r.purchase_date()) {
                if date < start || date > end {
                    return false;
                }
            }
            r.review_score >= filter.score_range.0
                && r.review_score <= filter.score_range.1
                && r.delivery_time >= filter.delivery_range.0
                && r.delivery_time <= filter.delivery_range.1
                && filter.status.matches(r.status)
        })
        .cloned()
        .collect()
}

/// Apply state membership, status, and delivery-range predicates.
pub fn filter_geo(rows: &[GeoOrder], filter: &GeoFilter) -> Vec<GeoOrder> {
    rows.iter()
        .filter(|g| {
            filter.states.contains(g.customer_state.as_str())
                && filter.status.matches(g.status)
                && g.delivery_time >= filter.delivery_range.0
                && g.delivery_time <= filter.delivery_range.1
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeliveryStatus;
    use chrono::NaiveDateTime;

    fn review(id: &str, date: Option<&str>, score: u8, days: f64, status: DeliveryStatus) -> OrderReview {
        OrderReview {
            order_id: id.into(),
            purchase_ts: date
                .map(|d| NaiveDateTime::parse_from_str(d, "%Y-%m-%d %H:%M:%S").unwrap()),
            delivered_ts: None,
            delivery_time: days,
            review_score: score,
            status,
        }
    }

    fn geo(id: &str, state: &str, days: f64, status: DeliveryStatus) -> GeoOrder {
        GeoOrder {
            order_id: id.into(),
            customer_state: state.into(),
            city: "city".into(),
            lat: -23.5,
            lng: -46.6,
            delivery_time: days,
            status,
        }
    }

    fn sample_reviews() -> Vec<OrderReview> {
        vec![
            review("a", Some("2018-01-10 09:00:00"), 5, 5.0, DeliveryStatus::OnTime),
            review("b", Some("2018-02-20 15:00:00"), 2, 25.0, DeliveryStatus::Late),
            review("c", Some("2018-03-05 11:00:00"), 4, 12.0, DeliveryStatus::OnTime),
            review("d", None, 1, 40.0, DeliveryStatus::Late),
        ]
    }

    #[test]
    fn test_all_predicates_conjunctive() {
        let rows = sample_reviews();
        let filter = ReviewFilter {
            date_range: Some((
                NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2018, 2, 28).unwrap(),
            )),
            score_range: (1, 5),
            delivery_range: (0.0, 30.0),
            status: StatusFilter::Late,
        };
        let out = filter_reviews(&rows, &filter);
        // "d" has no timestamp so it passes the date filter, but its
        // delivery_time of 40 fails the range check
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].order_id, "b");
        for r in &out {
            assert!(r.review_score >= 1 && r.review_score <= 5);
            assert!(r.delivery_time <= 30.0);
            assert_eq!(r.status, DeliveryStatus::Late);
        }
    }

    #[test]
    fn test_date_bounds_inclusive_at_day_granularity() {
        let rows = vec![review(
            "x",
            Some("2018-01-10 23:59:00"),
            5,
            5.0,
            DeliveryStatus::OnTime,
        )];
        let filter = ReviewFilter {
            date_range: Some((
                NaiveDate::from_ymd_opt(2018, 1, 10).unwrap(),
                NaiveDate::from_ymd_opt(2018, 1, 10).unwrap(),
            )),
            ..ReviewFilter::default()
        };
        // time-of-day is discarded; the row's day equals both bounds
        assert_eq!(filter_reviews(&rows, &filter).len(), 1);
    }

    #[test]
    fn test_missing_timestamp_skips_date_filter() {
        let rows = vec![review("d", None, 3, 10.0, DeliveryStatus::OnTime)];
        let filter = ReviewFilter {
            date_range: Some((
                NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2018, 1, 2).unwrap(),
            )),
            ..ReviewFilter::default()
        };
        assert_eq!(filter_reviews(&rows, &filter).len(), 1);
    }

    #[test]
    fn test_output_is_subset_and_idempotent() {
        let rows = sample_reviews();
        let filter = ReviewFilter {
            score_range: (2, 5),
            delivery_range: (0.0, 30.0),
            ..ReviewFilter::default()
        };
        let once = filter_reviews(&rows, &filter);
        assert!(once.len() <= rows.len());
        let twice = filter_reviews(&once, &filter);
        assert_eq!(once.len(), twice.len());
        let ids: Vec<_> = once.iter().map(|r| r.order_id.as_str()).collect();
        let ids2: Vec<_> = twice.iter().map(|r| r.order_id.as_str()).collect();
        assert_eq!(ids, ids2);
    }

    #[test]
    fn test_geo_empty_state_set_selects_nothing() {
        let rows = vec![
            geo("a", "SP", 5.0, DeliveryStatus::OnTime),
            geo("b", "RJ", 9.0, DeliveryStatus::Late),
        ];
        let filter = GeoFilter {
            states: HashSet::new(),
            status: StatusFilter::All,
            delivery_range: (0.0, 60.0),
        };
        assert!(filter_geo(&rows, &filter).is_empty());
    }

    #[test]
    fn test_geo_full_state_set_selects_everything() {
        let rows = vec![
            geo("a", "SP", 5.0, DeliveryStatus::OnTime),
            geo("b", "RJ", 9.0, DeliveryStatus::Late),
            geo("c", "MG", 14.0, DeliveryStatus::OnTime),
        ];
        let filter = GeoFilter::all_states(["SP".to_string(), "RJ".to_string(), "MG".to_string()]);
        assert_eq!(filter_geo(&rows, &filter).len(), 3);
    }

    #[test]
    fn test_geo_status_and_range() {
        let rows = vec![
            geo("a", "SP", 5.0, DeliveryStatus::OnTime),
            geo("b", "SP", 45.0, DeliveryStatus::Late),
            geo("c", "SP", 9.0, DeliveryStatus::Late),
        ];
        let filter = GeoFilter {
            states: ["SP".to_string()].into_iter().collect(),
            status: StatusFilter::Late,
            delivery_range: (0.0, 30.0),
        };
        let out = filter_geo(&rows, &filter);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].order_id, "c");
    }
}
