//! Synthetic data generator for the Brasil e-commerce dataset
//!
//! Produces the two dashboard CSVs with controlled random variation:
//! delivery times grow with distance from the southeast hub, review scores
//! correlate negatively with delivery time, and order volume is weighted
//! toward the populous states.
//!
//! Usage:
//!   cargo run --release --bin generate_synthetic -- [OPTIONS]
//!
//! Options:
//!   --orders <N>        Number of orders to generate (default: 5000)
//!   --seed <N>          Random seed for reproducibility (optional)
//!   --reviews-output    Output path for orders_reviews.csv
//!   --geo-output        Output path for geo_orders.csv

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use clap::Parser;
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "generate_synthetic")]
#[command(about = "Generate synthetic e-commerce delivery data")]
struct Args {
    /// Number of orders to generate
    #[arg(long, default_value = "5000")]
    orders: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output path for the orders-reviews table
    #[arg(long, default_value = "data/orders_reviews.csv")]
    reviews_output: PathBuf,

    /// Output path for the geo-orders table
    #[arg(long, default_value = "data/geo_orders.csv")]
    geo_output: PathBuf,
}

#[derive(Debug, Serialize)]
struct ReviewRow {
    order_id: String,
    order_purchase_timestamp: String,
    order_delivered_customer_date: String,
    delivery_time: f64,
    review_score: u8,
    delivery_status: String,
}

#[derive(Debug, Serialize)]
struct GeoRow {
    order_id: String,
    customer_state: String,
    geolocation_city: String,
    geolocation_lat: f64,
    geolocation_lng: f64,
    delivery_time: f64,
    delivery_status: String,
}

/// State sampling table: UF code, volume weight, anchor lat/lng, baseline
/// delivery days from the southeast distribution hubs, cities
struct StateDef {
    code: &'static str,
    weight: u32,
    lat: f64,
    lng: f64,
    base_days: f64,
    cities: &'static [&'static str],
}

const STATES: &[StateDef] = &[
    StateDef { code: "SP", weight: 42, lat: -23.55, lng: -46.63, base_days: 8.0, cities: &["São Paulo", "Campinas", "Santos", "Sorocaba"] },
    StateDef { code: "RJ", weight: 13, lat: -22.91, lng: -43.17, base_days: 11.0, cities: &["Rio de Janeiro", "Niterói", "Duque de Caxias"] },
    StateDef { code: "MG", weight: 12, lat: -19.92, lng: -43.94, base_days: 11.5, cities: &["Belo Horizonte", "Uberlândia", "Juiz de Fora"] },
    StateDef { code: "RS", weight: 6, lat: -30.03, lng: -51.23, base_days: 14.5, cities: &["Porto Alegre", "Caxias do Sul"] },
    StateDef { code: "PR", weight: 5, lat: -25.43, lng: -49.27, base_days: 12.5, cities: &["Curitiba", "Londrina", "Maringá"] },
    StateDef { code: "SC", weight: 4, lat: -27.60, lng: -48.55, base_days: 14.0, cities: &["Florianópolis", "Joinville"] },
    StateDef { code: "BA", weight: 4, lat: -12.97, lng: -38.50, base_days: 18.5, cities: &["Salvador", "Feira de Santana"] },
    StateDef { code: "DF", weight: 3, lat: -15.78, lng: -47.93, base_days: 12.5, cities: &["Brasília"] },
    StateDef { code: "GO", weight: 2, lat: -16.69, lng: -49.26, base_days: 15.0, cities: &["Goiânia", "Anápolis"] },
    StateDef { code: "PE", weight: 2, lat: -8.05, lng: -34.90, base_days: 20.0, cities: &["Recife", "Olinda"] },
    StateDef { code: "CE", weight: 2, lat: -3.72, lng: -38.54, base_days: 21.0, cities: &["Fortaleza"] },
    StateDef { code: "PA", weight: 1, lat: -1.46, lng: -48.49, base_days: 24.0, cities: &["Belém"] },
    StateDef { code: "AM", weight: 1, lat: -3.12, lng: -60.02, base_days: 26.0, cities: &["Manaus"] },
];

fn pick_state(rng: &mut StdRng) -> &'static StateDef {
    let total: u32 = STATES.iter().map(|s| s.weight).sum();
    let mut roll = rng.gen_range(0..total);
    for state in STATES {
        if roll < state.weight {
            return state;
        }
        roll -= state.weight;
    }
    &STATES[0]
}

/// Score distribution skews positive and degrades with slow delivery,
/// mirroring the shape of the real dataset
fn pick_score(rng: &mut StdRng, delivery_time: f64, late: bool) -> u8 {
    let slow_penalty = (delivery_time / 15.0).min(2.0);
    let late_penalty = if late { 1.2 } else { 0.0 };
    let weights: [f64; 5] = [
        0.04 + 0.10 * (slow_penalty + late_penalty), // score 1
        0.03 + 0.05 * (slow_penalty + late_penalty),
        0.08 + 0.04 * slow_penalty,
        0.19,
        0.66 - 0.18 * (slow_penalty + late_penalty), // score 5
    ];
    let total: f64 = weights.iter().map(|w| w.max(0.01)).sum();
    let mut roll = rng.gen_range(0.0..total);
    for (i, w) in weights.iter().enumerate() {
        let w = w.max(0.01);
        if roll < w {
            return (i + 1) as u8;
        }
        roll -= w;
    }
    5
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    info!("Generating {} synthetic orders", args.orders);

    let epoch = NaiveDate::from_ymd_opt(2017, 1, 1).expect("valid date");
    let span_days = 600i64;

    let mut review_rows = Vec::with_capacity(args.orders);
    let mut geo_rows = Vec::with_capacity(args.orders);

    for i in 0..args.orders {
        let order_id = format!("ord-{:06}", i);
        let state = pick_state(&mut rng);
        let city = state.cities.choose(&mut rng).copied().unwrap_or("?");

        let purchase = epoch
            .and_hms_opt(0, 0, 0)
            .expect("valid time")
            + Duration::days(rng.gen_range(0..span_days))
            + Duration::seconds(rng.gen_range(0..86_400));

        // lognormal-ish skew: most orders near the state baseline, a long
        // right tail for the slow ones
        let noise: f64 = rng.gen_range(-0.4..1.0);
        let delivery_time =
            (state.base_days * (1.0 + noise) + rng.gen_range(0.0..4.0)).clamp(1.0, 60.0).round();
        let delivered = purchase + Duration::days(delivery_time as i64);

        let promised = state.base_days * 1.6 + 4.0;
        let late = delivery_time > promised;
        let status = if late { "Late" } else { "On Time" };

        let score = pick_score(&mut rng, delivery_time, late);

        review_rows.push(ReviewRow {
            order_id: order_id.clone(),
            order_purchase_timestamp: purchase.format("%Y-%m-%d %H:%M:%S").to_string(),
            order_delivered_customer_date: delivered.format("%Y-%m-%d %H:%M:%S").to_string(),
            delivery_time,
            review_score: score,
            delivery_status: status.to_string(),
        });

        geo_rows.push(GeoRow {
            order_id,
            customer_state: state.code.to_string(),
            geolocation_city: city.to_string(),
            geolocation_lat: state.lat + rng.gen_range(-0.8..0.8),
            geolocation_lng: state.lng + rng.gen_range(-0.8..0.8),
            delivery_time,
            delivery_status: status.to_string(),
        });
    }

    if let Some(parent) = args.reviews_output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if let Some(parent) = args.geo_output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = WriterBuilder::new().from_path(&args.reviews_output)?;
    for row in &review_rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(
        "Wrote {} review rows to {}",
        review_rows.len(),
        args.reviews_output.display()
    );

    let mut writer = WriterBuilder::new().from_path(&args.geo_output)?;
    for row in &geo_rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(
        "Wrote {} geo rows to {}",
        geo_rows.len(),
        args.geo_output.display()
    );

    Ok(())
}
