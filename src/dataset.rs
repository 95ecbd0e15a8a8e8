//! Dataset loading
//!
//! Both tables are read once at startup and held immutable for the process
//! lifetime. Downstream code receives the `Dataset` handle explicitly; there
//! is no global cache to invalidate.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

use crate::models::{GeoCsvRecord, GeoOrder, OrderReview, ReviewCsvRecord};

/// Delivery-time slider ceiling, matching the dashboard control
pub const MAX_DELIVERY_CAP: f64 = 60.0;

/// Immutable snapshot of both tables
#[derive(Debug)]
pub struct Dataset {
    pub reviews: Vec<OrderReview>,
    pub geo: Vec<GeoOrder>,
}

impl Dataset {
    pub fn load(reviews_path: &Path, geo_path: &Path) -> Result<Dataset> {
        let reviews = load_reviews(reviews_path)?;
        let geo = load_geo(geo_path)?;
        info!(
            "Loaded {} order-review rows, {} geo rows",
            reviews.len(),
            geo.len()
        );
        Ok(Dataset { reviews, geo })
    }

    /// All state codes present in the geo table, sorted
    pub fn state_codes(&self) -> Vec<String> {
        let states: BTreeSet<&str> = self
            .geo
            .iter()
            .map(|g| g.customer_state.as_str())
            .collect();
        states.into_iter().map(String::from).collect()
    }

    /// Observed purchase-date span, if any rows carry timestamps
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.reviews.iter().filter_map(|r| r.purchase_date());
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some((min, max))
    }

    /// Max observed delivery time, capped for the range control
    pub fn max_delivery_time(&self) -> f64 {
        self.reviews
            .iter()
            .map(|r| r.delivery_time)
            .fold(0.0, f64::max)
            .min(MAX_DELIVERY_CAP)
    }
}

fn load_reviews(path: &Path) -> Result<Vec<OrderReview>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (i, result) in reader.deserialize::<ReviewCsvRecord>().enumerate() {
        match result.map_err(anyhow::Error::from).and_then(|r| r.to_order_review()) {
            Ok(row) => rows.push(row),
            Err(e) => {
                if skipped < 5 {
                    warn!("Skipping review row {}: {}", i, e);
                }
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        warn!("Skipped {} unparseable review rows", skipped);
    }
    Ok(rows)
}

fn load_geo(path: &Path) -> Result<Vec<GeoOrder>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (i, result) in reader.deserialize::<GeoCsvRecord>().enumerate() {
        match result {
            Ok(rec) => rows.push(rec.to_geo_order()),
            Err(e) => {
                if skipped < 5 {
                    warn!("Skipping geo row {}: {}", i, e);
                }
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        warn!("Skipped {} unparseable geo rows", skipped);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeliveryStatus;
    use chrono::NaiveDateTime;

    fn review(days: f64, date: Option<&str>) -> OrderReview {
        OrderReview {
            order_id: "o".into(),
            purchase_ts: date
                .map(|d| NaiveDateTime::parse_from_str(d, "%Y-%m-%d %H:%M:%S").unwrap()),
            delivered_ts: None,
            delivery_time: days,
            review_score: 5,
            status: DeliveryStatus::OnTime,
        }
    }

    #[test]
    fn test_date_span() {
        let ds = Dataset {
            reviews: vec![
                review(3.0, Some("2018-02-01 08:00:00")),
                review(4.0, None),
                review(5.0, Some("2017-11-20 12:00:00")),
            ],
            geo: vec![],
        };
        let (min, max) = ds.date_span().unwrap();
        assert_eq!(min, NaiveDate::from_ymd_opt(2017, 11, 20).unwrap());
        assert_eq!(max, NaiveDate::from_ymd_opt(2018, 2, 1).unwrap());
    }

    #[test]
    fn test_date_span_without_timestamps() {
        let ds = Dataset {
            reviews: vec![review(3.0, None)],
            geo: vec![],
        };
        assert!(ds.date_span().is_none());
    }

    #[test]
    fn test_max_delivery_capped() {
        let ds = Dataset {
            reviews: vec![review(95.0, None), review(12.0, None)],
            geo: vec![],
        };
        assert_eq!(ds.max_delivery_time(), MAX_DELIVERY_CAP);
    }
}
