use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Raw record from the orders_reviews CSV
#[derive(Debug, Deserialize)]
pub struct ReviewCsvRecord {
    pub order_id: String,
    #[serde(default)]
    pub order_purchase_timestamp: Option<String>,
    #[serde(default)]
    pub order_delivered_customer_date: Option<String>,
    pub delivery_time: f64,
    pub review_score: u8,
    pub delivery_status: String,
}

/// Raw record from the geo_orders CSV
#[derive(Debug, Deserialize)]
pub struct GeoCsvRecord {
    pub order_id: String,
    pub customer_state: String,
    pub geolocation_city: String,
    pub geolocation_lat: f64,
    pub geolocation_lng: f64,
    pub delivery_time: f64,
    pub delivery_status: String,
}

/// Delivery outcome classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliveryStatus {
    OnTime,
    Late,
}

impl From<&str> for DeliveryStatus {
    fn from(s: &str) -> Self {
        match s {
            "Late" | "LATE" | "late" => DeliveryStatus::Late,
            _ => DeliveryStatus::OnTime,
        }
    }
}

impl DeliveryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::OnTime => "On Time",
            DeliveryStatus::Late => "Late",
        }
    }
}

/// Status selection for filtering; `All` is the no-op sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    OnTime,
    Late,
}

impl From<&str> for StatusFilter {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "on_time" | "ontime" | "on-time" => StatusFilter::OnTime,
            "late" => StatusFilter::Late,
            _ => StatusFilter::All,
        }
    }
}

impl StatusFilter {
    pub fn matches(&self, status: DeliveryStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::OnTime => status == DeliveryStatus::OnTime,
            StatusFilter::Late => status == DeliveryStatus::Late,
        }
    }
}

/// One row of the order-review table
#[derive(Debug, Clone, Serialize)]
pub struct OrderReview {
    pub order_id: String,
    pub purchase_ts: Option<NaiveDateTime>,
    pub delivered_ts: Option<NaiveDateTime>,
    pub delivery_time: f64,
    pub review_score: u8,
    pub status: DeliveryStatus,
}

impl OrderReview {
    pub fn purchase_date(&self) -> Option<NaiveDate> {
        self.purchase_ts.map(|ts| ts.date())
    }
}

/// One row of the geolocated order table
#[derive(Debug, Clone, Serialize)]
pub struct GeoOrder {
    pub order_id: String,
    pub customer_state: String,
    pub city: String,
    pub lat: f64,
    pub lng: f64,
    pub delivery_time: f64,
    pub status: DeliveryStatus,
}

fn parse_timestamp(raw: &str) -> anyhow::Result<NaiveDateTime> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(ts);
    }
    // Some exports carry date-only values
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("invalid date: {}", raw))
}

impl ReviewCsvRecord {
    pub fn to_order_review(&self) -> anyhow::Result<OrderReview> {
        let purchase_ts = self
            .order_purchase_timestamp
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(parse_timestamp)
            .transpose()?;
        let delivered_ts = self
            .order_delivered_customer_date
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(parse_timestamp)
            .transpose()?;

        Ok(OrderReview {
            order_id: self.order_id.clone(),
            purchase_ts,
            delivered_ts,
            delivery_time: self.delivery_time,
            review_score: self.review_score,
            status: DeliveryStatus::from(self.delivery_status.as_str()),
        })
    }
}

impl GeoCsvRecord {
    pub fn to_geo_order(&self) -> GeoOrder {
        GeoOrder {
            order_id: self.order_id.clone(),
            customer_state: self.customer_state.clone(),
            city: self.geolocation_city.clone(),
            lat: self.geolocation_lat,
            lng: self.geolocation_lng,
            delivery_time: self.delivery_time,
            status: DeliveryStatus::from(self.delivery_status.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(DeliveryStatus::from("Late"), DeliveryStatus::Late);
        assert_eq!(DeliveryStatus::from("On Time"), DeliveryStatus::OnTime);
        // unknown labels default to on-time
        assert_eq!(DeliveryStatus::from("???"), DeliveryStatus::OnTime);
    }

    #[test]
    fn test_status_filter_matches() {
        assert!(StatusFilter::All.matches(DeliveryStatus::Late));
        assert!(StatusFilter::Late.matches(DeliveryStatus::Late));
        assert!(!StatusFilter::OnTime.matches(DeliveryStatus::Late));
    }

    #[test]
    fn test_record_parse_with_missing_timestamp() {
        let rec = ReviewCsvRecord {
            order_id: "o1".into(),
            order_purchase_timestamp: None,
            order_delivered_customer_date: None,
            delivery_time: 9.0,
            review_score: 4,
            delivery_status: "On Time".into(),
        };
        let row = rec.to_order_review().unwrap();
        assert!(row.purchase_ts.is_none());
        assert_eq!(row.review_score, 4);
    }

    #[test]
    fn test_record_parse_date_only() {
        let rec = ReviewCsvRecord {
            order_id: "o2".into(),
            order_purchase_timestamp: Some("2018-03-05".into()),
            order_delivered_customer_date: Some("2018-03-15 10:30:00".into()),
            delivery_time: 10.0,
            review_score: 5,
            delivery_status: "Late".into(),
        };
        let row = rec.to_order_review().unwrap();
        assert_eq!(
            row.purchase_date(),
            Some(NaiveDate::from_ymd_opt(2018, 3, 5).unwrap())
        );
        assert_eq!(row.status, DeliveryStatus::Late);
    }
}
