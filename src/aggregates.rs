//! Aggregation catalog
//!
//! One pure function per visualization. Every function takes a filtered view
//! and returns a new value; zero-row input yields empty vectors or `None`
//! statistics, never a panic.

use chrono::Datelike;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{DeliveryStatus, GeoOrder, OrderReview};
use crate::stats;

/// States with fewer rows than this are dropped from the per-state
/// delivery-time ranking
pub const STATE_SAMPLE_FLOOR: usize = 100;

/// Delivery-time bucket labels, inclusive upper bounds, last unbounded
pub const DELIVERY_BUCKETS: [&str; 5] = ["0-7", "8-14", "15-21", "22-30", ">30"];

/// Bucket index for a delivery time in days
pub fn delivery_bucket(days: f64) -> usize {
    if days <= 7.0 {
        0
    } else if days <= 14.0 {
        1
    } else if days <= 21.0 {
        2
    } else if days <= 30.0 {
        3
    } else {
        4
    }
}

// ============================================================================
// Review-table aggregates
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ScoreCount {
    pub score: u8,
    pub count: usize,
}

/// Orders per observed review score, ascending. Scores with no rows are
/// absent, matching the source chart.
pub fn score_distribution(rows: &[OrderReview]) -> Vec<ScoreCount> {
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for r in rows {
        *counts.entry(r.review_score).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(score, count)| ScoreCount { score, count })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryStats {
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Histogram overlay markers for the delivery-time distribution
pub fn delivery_stats(rows: &[OrderReview]) -> DeliveryStats {
    let times: Vec<f64> = rows.iter().map(|r| r.delivery_time).collect();
    DeliveryStats {
        mean: stats::mean(&times),
        median: stats::median(&times),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusShare {
    pub status: &'static str,
    pub count: usize,
    pub pct: f64,
}

/// Two-category split of the filtered view; categories with zero rows are
/// omitted, and an empty view yields an empty vector
pub fn status_proportion(rows: &[OrderReview]) -> Vec<StatusShare> {
    if rows.is_empty() {
        return Vec::new();
    }
    let total = rows.len() as f64;
    let late = rows.iter().filter(|r| r.status == DeliveryStatus::Late).count();
    let on_time = rows.len() - late;
    [(DeliveryStatus::OnTime, on_time), (DeliveryStatus::Late, late)]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(status, count)| StatusShare {
            status: status.label(),
            count,
            pct: count as f64 / total * 100.0,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyTrend {
    /// "YYYY-MM"
    pub month: String,
    pub orders: usize,
    pub avg_delivery: f64,
    pub avg_score: f64,
    pub late: usize,
    pub late_pct: f64,
}

/// Per calendar month of the purchase timestamp: order count, mean delivery
/// time, mean score, late share. Rows without a timestamp are skipped.
/// Months come back chronologically.
pub fn monthly_trend(rows: &[OrderReview]) -> Vec<MonthlyTrend> {
    let mut groups: BTreeMap<(i32, u32), Vec<&OrderReview>> = BTreeMap::new();
    for r in rows {
        if let Some(ts) = r.purchase_ts {
            groups.entry((ts.year(), ts.month())).or_default().push(r);
        }
    }
    groups
        .into_iter()
        .map(|((year, month), group)| {
            let times: Vec<f64> = group.iter().map(|r| r.delivery_time).collect();
            let scores: Vec<f64> = group.iter().map(|r| r.review_score as f64).collect();
            let late = group
                .iter()
                .filter(|r| r.status == DeliveryStatus::Late)
                .count();
            MonthlyTrend {
                month: format!("{}-{:02}", year, month),
                orders: group.len(),
                avg_delivery: stats::mean(&times).unwrap_or(0.0),
                avg_score: stats::mean(&scores).unwrap_or(0.0),
                late,
                late_pct: late as f64 / group.len() as f64 * 100.0,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreDelivery {
    pub score: u8,
    pub avg_delivery: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvgDeliveryByScore {
    pub per_score: Vec<ScoreDelivery>,
    /// Reference line across all filtered rows
    pub overall: Option<f64>,
}

pub fn avg_delivery_by_score(rows: &[OrderReview]) -> AvgDeliveryByScore {
    let mut groups: BTreeMap<u8, Vec<f64>> = BTreeMap::new();
    for r in rows {
        groups.entry(r.review_score).or_default().push(r.delivery_time);
    }
    let per_score = groups
        .into_iter()
        .map(|(score, times)| ScoreDelivery {
            score,
            avg_delivery: stats::mean(&times).unwrap_or(0.0),
            count: times.len(),
        })
        .collect();
    let all: Vec<f64> = rows.iter().map(|r| r.delivery_time).collect();
    AvgDeliveryByScore {
        per_score,
        overall: stats::mean(&all),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Heatmap {
    /// Observed scores, ascending; one column per entry
    pub scores: Vec<u8>,
    pub buckets: Vec<&'static str>,
    /// counts[bucket][score column], missing combinations are 0
    pub counts: Vec<Vec<usize>>,
}

/// Cross-tab of delivery-time bucket by review score
pub fn score_heatmap(rows: &[OrderReview]) -> Heatmap {
    let score_set: std::collections::BTreeSet<u8> =
        rows.iter().map(|r| r.review_score).collect();
    let scores: Vec<u8> = score_set.into_iter().collect();
    let col: HashMap<u8, usize> = scores.iter().enumerate().map(|(i, s)| (*s, i)).collect();

    let mut counts = vec![vec![0usize; scores.len()]; DELIVERY_BUCKETS.len()];
    for r in rows {
        counts[delivery_bucket(r.delivery_time)][col[&r.review_score]] += 1;
    }
    Heatmap {
        scores,
        buckets: DELIVERY_BUCKETS.to_vec(),
        counts,
    }
}

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, Serialize)]
pub struct WeekdayCount {
    pub day: &'static str,
    pub count: usize,
}

/// Orders per weekday of purchase, fixed Monday through Sunday order with
/// zero-filled gaps. Rows without a timestamp are skipped.
pub fn weekday_distribution(rows: &[OrderReview]) -> Vec<WeekdayCount> {
    let mut counts = [0usize; 7];
    for r in rows {
        if let Some(ts) = r.purchase_ts {
            counts[ts.weekday().num_days_from_monday() as usize] += 1;
        }
    }
    WEEKDAY_NAMES
        .iter()
        .copied()
        .zip(counts)
        .map(|(day, count)| WeekdayCount { day, count })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryDetail {
    pub label: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample std-dev; `None` for single-row groups
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub late: usize,
    pub late_pct: f64,
}

fn detail_row(label: String, times: &[f64], late: usize) -> DeliveryDetail {
    DeliveryDetail {
        label,
        count: times.len(),
        mean: stats::mean(times).unwrap_or(0.0),
        median: stats::median(times).unwrap_or(0.0),
        std: stats::std_dev(times),
        min: times.iter().copied().fold(f64::INFINITY, f64::min),
        max: times.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        late,
        late_pct: late as f64 / times.len() as f64 * 100.0,
    }
}

/// Delivery-time statistics per review score, ascending
pub fn score_detail(rows: &[OrderReview]) -> Vec<DeliveryDetail> {
    let mut groups: BTreeMap<u8, (Vec<f64>, usize)> = BTreeMap::new();
    for r in rows {
        let entry = groups.entry(r.review_score).or_default();
        entry.0.push(r.delivery_time);
        if r.status == DeliveryStatus::Late {
            entry.1 += 1;
        }
    }
    groups
        .into_iter()
        .map(|(score, (times, late))| detail_row(score.to_string(), &times, late))
        .collect()
}

/// Summary KPIs over the filtered reviews view
#[derive(Debug, Clone, Serialize)]
pub struct SummaryMetrics {
    pub total: usize,
    pub mean_delivery: Option<f64>,
    pub median_delivery: Option<f64>,
    pub mean_score: Option<f64>,
    /// Pearson correlation of delivery_time vs review_score
    pub correlation: Option<f64>,
    pub late_pct: Option<f64>,
}

pub fn summary_metrics(rows: &[OrderReview]) -> SummaryMetrics {
    let times: Vec<f64> = rows.iter().map(|r| r.delivery_time).collect();
    let scores: Vec<f64> = rows.iter().map(|r| r.review_score as f64).collect();
    let late_pct = if rows.is_empty() {
        None
    } else {
        let late = rows.iter().filter(|r| r.status == DeliveryStatus::Late).count();
        Some(late as f64 / rows.len() as f64 * 100.0)
    };
    SummaryMetrics {
        total: rows.len(),
        mean_delivery: stats::mean(&times),
        median_delivery: stats::median(&times),
        mean_score: stats::mean(&scores),
        correlation: stats::pearson(&times, &scores),
        late_pct,
    }
}

// ============================================================================
// Geo-table aggregates
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct StateLatePct {
    pub state: String,
    pub total: usize,
    pub late: usize,
    pub late_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LateByState {
    /// Descending by late percentage
    pub states: Vec<StateLatePct>,
    /// Unweighted mean of the per-state percentages (mean of means, as the
    /// dashboard draws its reference line)
    pub mean_pct: Option<f64>,
}

pub fn late_percentage_by_state(rows: &[GeoOrder]) -> LateByState {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for g in rows {
        let entry = groups.entry(g.customer_state.as_str()).or_default();
        entry.0 += 1;
        if g.status == DeliveryStatus::Late {
            entry.1 += 1;
        }
    }
    let mut states: Vec<StateLatePct> = groups
        .into_iter()
        .map(|(state, (total, late))| StateLatePct {
            state: state.to_string(),
            total,
            late,
            late_pct: late as f64 / total as f64 * 100.0,
        })
        .collect();
    let pcts: Vec<f64> = states.iter().map(|s| s.late_pct).collect();
    states.sort_by(|a, b| b.late_pct.partial_cmp(&a.late_pct).unwrap_or(std::cmp::Ordering::Equal));
    LateByState {
        states,
        mean_pct: stats::mean(&pcts),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StateDelivery {
    pub state: String,
    pub avg_delivery: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryTimeByState {
    /// Ascending by mean delivery time; states under the sample floor dropped
    pub states: Vec<StateDelivery>,
    /// Mean over all filtered rows, for the reference line
    pub overall: Option<f64>,
}

pub fn delivery_time_by_state(rows: &[GeoOrder]) -> DeliveryTimeByState {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for g in rows {
        groups.entry(g.customer_state.as_str()).or_default().push(g.delivery_time);
    }
    let mut states: Vec<StateDelivery> = groups
        .into_iter()
        .filter(|(_, times)| times.len() >= STATE_SAMPLE_FLOOR)
        .map(|(state, times)| StateDelivery {
            state: state.to_string(),
            avg_delivery: stats::mean(&times).unwrap_or(0.0),
            count: times.len(),
        })
        .collect();
    states.sort_by(|a, b| {
        a.avg_delivery
            .partial_cmp(&b.avg_delivery)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let all: Vec<f64> = rows.iter().map(|g| g.delivery_time).collect();
    DeliveryTimeByState {
        states,
        overall: stats::mean(&all),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CityCount {
    pub city: String,
    pub count: usize,
}

/// Top N cities by order count. N is clamped to the dashboard control range
/// [5, 20]; ties break by first appearance in the view.
pub fn top_cities(rows: &[GeoOrder], n: usize) -> Vec<CityCount> {
    let n = n.clamp(5, 20);
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (i, g) in rows.iter().enumerate() {
        let entry = counts.entry(g.city.as_str()).or_insert((0, i));
        entry.0 += 1;
    }
    let mut cities: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(city, (count, first_seen))| (city, count, first_seen))
        .collect();
    // stable tie order: first-seen index breaks equal counts
    cities.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    cities
        .into_iter()
        .take(n)
        .map(|(city, count, _)| CityCount {
            city: city.to_string(),
            count,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct StateStatusCount {
    pub state: String,
    pub on_time: usize,
    pub late: usize,
    pub total: usize,
}

/// On-time vs late counts per state, descending by total volume
pub fn state_status_counts(rows: &[GeoOrder]) -> Vec<StateStatusCount> {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for g in rows {
        let entry = groups.entry(g.customer_state.as_str()).or_default();
        match g.status {
            DeliveryStatus::OnTime => entry.0 += 1,
            DeliveryStatus::Late => entry.1 += 1,
        }
    }
    let mut states: Vec<StateStatusCount> = groups
        .into_iter()
        .map(|(state, (on_time, late))| StateStatusCount {
            state: state.to_string(),
            on_time,
            late,
            total: on_time + late,
        })
        .collect();
    states.sort_by(|a, b| b.total.cmp(&a.total));
    states
}

/// Delivery-time statistics per state, descending by volume
pub fn state_detail(rows: &[GeoOrder]) -> Vec<DeliveryDetail> {
    let mut groups: BTreeMap<&str, (Vec<f64>, usize)> = BTreeMap::new();
    for g in rows {
        let entry = groups.entry(g.customer_state.as_str()).or_default();
        entry.0.push(g.delivery_time);
        if g.status == DeliveryStatus::Late {
            entry.1 += 1;
        }
    }
    let mut details: Vec<DeliveryDetail> = groups
        .into_iter()
        .map(|(state, (times, late))| detail_row(state.to_string(), &times, late))
        .collect();
    details.sort_by(|a, b| b.count.cmp(&a.count));
    details
}
