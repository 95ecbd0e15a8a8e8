//! REST API handlers
//!
//! Every aggregate endpoint accepts the same filter query parameters and
//! recomputes from the immutable dataset snapshot; nothing is cached between
//! requests.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::aggregates::{
    self, AvgDeliveryByScore, CityCount, DeliveryDetail, DeliveryTimeByState, Heatmap,
    LateByState, MonthlyTrend, ScoreCount, StateStatusCount, StatusShare, SummaryMetrics,
    WeekdayCount,
};
use crate::dataset::Dataset;
use crate::filters::{filter_geo, filter_reviews, GeoFilter, ReviewFilter};
use crate::models::{GeoOrder, OrderReview, StatusFilter};
use crate::stats::Describe;

pub type AppState = Arc<Dataset>;

// ============================================================================
// Query Parameters
// ============================================================================

/// Shared filter parameters; absent fields fall back to the widest selection
#[derive(Debug, Deserialize, Default)]
pub struct FilterQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub min_score: Option<u8>,
    pub max_score: Option<u8>,
    pub min_days: Option<f64>,
    pub max_days: Option<f64>,
    pub status: Option<String>,
    /// Comma-separated UF codes; absent means all states, empty means none
    pub states: Option<String>,
    pub n: Option<usize>,
    pub limit: Option<usize>,
}

impl FilterQuery {
    fn status_filter(&self) -> StatusFilter {
        self.status
            .as_deref()
            .map(StatusFilter::from)
            .unwrap_or(StatusFilter::All)
    }

    fn delivery_range(&self) -> (f64, f64) {
        (
            self.min_days.unwrap_or(0.0),
            self.max_days.unwrap_or(crate::dataset::MAX_DELIVERY_CAP),
        )
    }

    pub fn review_filter(&self) -> ReviewFilter {
        ReviewFilter {
            // the date filter only engages when both ends are given
            date_range: self.from.zip(self.to),
            score_range: (self.min_score.unwrap_or(1), self.max_score.unwrap_or(5)),
            delivery_range: self.delivery_range(),
            status: self.status_filter(),
        }
    }

    pub fn geo_filter(&self, dataset: &Dataset) -> GeoFilter {
        let states = match &self.states {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => dataset.state_codes().into_iter().collect(),
        };
        GeoFilter {
            states,
            status: self.status_filter(),
            delivery_range: self.delivery_range(),
        }
    }
}

fn reviews(dataset: &Dataset, q: &FilterQuery) -> Vec<OrderReview> {
    filter_reviews(&dataset.reviews, &q.review_filter())
}

fn geo(dataset: &Dataset, q: &FilterQuery) -> Vec<GeoOrder> {
    filter_geo(&dataset.geo, &q.geo_filter(dataset))
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct MetaResponse {
    pub review_rows: usize,
    pub geo_rows: usize,
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
    pub max_delivery_time: f64,
    pub states: Vec<String>,
}

#[derive(Serialize)]
pub struct DescribeResponse {
    pub delivery_time: Describe,
    pub review_score: Describe,
}

#[derive(Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct GeoPointsResponse {
    pub total: usize,
    pub points: Vec<GeoPoint>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/v1/meta
pub async fn meta(State(dataset): State<AppState>) -> Json<MetaResponse> {
    let span = dataset.date_span();
    Json(MetaResponse {
        review_rows: dataset.reviews.len(),
        geo_rows: dataset.geo.len(),
        date_min: span.map(|(lo, _)| lo),
        date_max: span.map(|(_, hi)| hi),
        max_delivery_time: dataset.max_delivery_time(),
        states: dataset.state_codes(),
    })
}

/// GET /api/v1/summary
pub async fn summary(
    State(dataset): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<SummaryMetrics> {
    Json(aggregates::summary_metrics(&reviews(&dataset, &q)))
}

/// GET /api/v1/reviews/describe
pub async fn describe(
    State(dataset): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<DescribeResponse> {
    let rows = reviews(&dataset, &q);
    let times: Vec<f64> = rows.iter().map(|r| r.delivery_time).collect();
    let scores: Vec<f64> = rows.iter().map(|r| r.review_score as f64).collect();
    Json(DescribeResponse {
        delivery_time: crate::stats::describe(&times),
        review_score: crate::stats::describe(&scores),
    })
}

/// GET /api/v1/reviews/score-distribution
pub async fn score_distribution(
    State(dataset): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<Vec<ScoreCount>> {
    Json(aggregates::score_distribution(&reviews(&dataset, &q)))
}

/// GET /api/v1/reviews/status-proportion
pub async fn status_proportion(
    State(dataset): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<Vec<StatusShare>> {
    Json(aggregates::status_proportion(&reviews(&dataset, &q)))
}

/// GET /api/v1/reviews/avg-delivery-by-score
pub async fn avg_delivery_by_score(
    State(dataset): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<AvgDeliveryByScore> {
    Json(aggregates::avg_delivery_by_score(&reviews(&dataset, &q)))
}

/// GET /api/v1/reviews/heatmap
pub async fn heatmap(
    State(dataset): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<Heatmap> {
    Json(aggregates::score_heatmap(&reviews(&dataset, &q)))
}

/// GET /api/v1/reviews/score-detail
pub async fn score_detail(
    State(dataset): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<Vec<DeliveryDetail>> {
    Json(aggregates::score_detail(&reviews(&dataset, &q)))
}

/// GET /api/v1/trends/monthly
pub async fn monthly_trend(
    State(dataset): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<Vec<MonthlyTrend>> {
    Json(aggregates::monthly_trend(&reviews(&dataset, &q)))
}

/// GET /api/v1/trends/weekday
pub async fn weekday_distribution(
    State(dataset): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<Vec<WeekdayCount>> {
    Json(aggregates::weekday_distribution(&reviews(&dataset, &q)))
}

/// GET /api/v1/geo/late-by-state
pub async fn late_by_state(
    State(dataset): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<LateByState> {
    Json(aggregates::late_percentage_by_state(&geo(&dataset, &q)))
}

/// GET /api/v1/geo/delivery-by-state
pub async fn delivery_by_state(
    State(dataset): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<DeliveryTimeByState> {
    Json(aggregates::delivery_time_by_state(&geo(&dataset, &q)))
}

/// GET /api/v1/geo/top-cities?n=10
pub async fn top_cities(
    State(dataset): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<Vec<CityCount>> {
    let n = q.n.unwrap_or(10);
    Json(aggregates::top_cities(&geo(&dataset, &q), n))
}

/// GET /api/v1/geo/state-status
pub async fn state_status(
    State(dataset): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<Vec<StateStatusCount>> {
    Json(aggregates::state_status_counts(&geo(&dataset, &q)))
}

/// GET /api/v1/geo/state-detail
pub async fn state_detail(
    State(dataset): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<Vec<DeliveryDetail>> {
    Json(aggregates::state_detail(&geo(&dataset, &q)))
}

/// GET /api/v1/geo/points?limit=5000
pub async fn geo_points(
    State(dataset): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<GeoPointsResponse> {
    let rows = geo(&dataset, &q);
    let limit = q.limit.unwrap_or(5000);
    let points = rows
        .iter()
        .take(limit)
        .map(|g| GeoPoint {
            lat: g.lat,
            lng: g.lng,
            status: g.status.label(),
        })
        .collect();
    Json(GeoPointsResponse {
        total: rows.len(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeliveryStatus;

    fn dataset() -> Dataset {
        Dataset {
            reviews: vec![],
            geo: vec![
                GeoOrder {
                    order_id: "a".into(),
                    customer_state: "SP".into(),
                    city: "São Paulo".into(),
                    lat: -23.5,
                    lng: -46.6,
                    delivery_time: 9.0,
                    status: DeliveryStatus::OnTime,
                },
                GeoOrder {
                    order_id: "b".into(),
                    customer_state: "RJ".into(),
                    city: "Rio".into(),
                    lat: -22.9,
                    lng: -43.2,
                    delivery_time: 14.0,
                    status: DeliveryStatus::Late,
                },
            ],
        }
    }

    #[test]
    fn test_absent_states_param_means_all() {
        let ds = dataset();
        let q = FilterQuery::default();
        let filter = q.geo_filter(&ds);
        assert!(filter.states.contains("SP"));
        assert!(filter.states.contains("RJ"));
        assert_eq!(filter_geo(&ds.geo, &filter).len(), 2);
    }

    #[test]
    fn test_empty_states_param_means_none() {
        let ds = dataset();
        let q = FilterQuery {
            states: Some(String::new()),
            ..FilterQuery::default()
        };
        let filter = q.geo_filter(&ds);
        assert!(filter.states.is_empty());
        assert!(filter_geo(&ds.geo, &filter).is_empty());
    }

    #[test]
    fn test_states_param_parses_comma_list() {
        let ds = dataset();
        let q = FilterQuery {
            states: Some("SP, MG".into()),
            ..FilterQuery::default()
        };
        let filter = q.geo_filter(&ds);
        assert_eq!(filter.states.len(), 2);
        let out = filter_geo(&ds.geo, &filter);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].customer_state, "SP");
    }

    #[test]
    fn test_date_range_requires_both_ends() {
        let q = FilterQuery {
            from: Some(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()),
            ..FilterQuery::default()
        };
        assert!(q.review_filter().date_range.is_none());
    }
}
