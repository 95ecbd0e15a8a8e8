//! REST API Server for the Brasil E-Commerce Analytics dashboard
//!
//! Usage:
//!   ./target/release/api_server [options]
//!
//! Options:
//!   --port PORT       Port to listen on (default: 8080)
//!   --reviews PATH    Orders-reviews CSV (default: data/orders_reviews.csv)
//!   --geo PATH        Geo-orders CSV (default: data/geo_orders.csv)
//!
//! Endpoints:
//!   GET /api/v1/health                        - Health check
//!   GET /api/v1/meta                          - Dataset bounds for the UI controls
//!   GET /api/v1/summary                       - Top-level KPIs
//!   GET /api/v1/reviews/describe              - Delivery/score eight-number summary
//!   GET /api/v1/reviews/score-distribution    - Orders per review score
//!   GET /api/v1/reviews/status-proportion     - On-time vs late split
//!   GET /api/v1/reviews/avg-delivery-by-score - Mean delivery per score
//!   GET /api/v1/reviews/heatmap               - Delivery bucket x score cross-tab
//!   GET /api/v1/reviews/score-detail          - Per-score statistics table
//!   GET /api/v1/trends/monthly                - Monthly order/delivery/score trend
//!   GET /api/v1/trends/weekday                - Orders per weekday
//!   GET /api/v1/geo/late-by-state             - Late percentage per state
//!   GET /api/v1/geo/delivery-by-state         - Mean delivery per state (>=100 rows)
//!   GET /api/v1/geo/top-cities                - Top N cities by order count
//!   GET /api/v1/geo/state-status              - On-time/late counts per state
//!   GET /api/v1/geo/state-detail              - Per-state statistics table
//!   GET /api/v1/geo/points                    - Filtered scatter points
//!
//! All aggregate endpoints take the filter query parameters:
//!   from, to, min_score, max_score, min_days, max_days, status, states, n, limit

use anyhow::Result;
use axum::{routing::get, Router};
use brasil_ecommerce::{api::handlers, dataset::Dataset};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_banner(port: u16) {
    println!("============================================================");
    println!("       BRASIL E-COMMERCE DELIVERY ANALYTICS API");
    println!("============================================================");
    println!();
    println!("  Port:     {}", port);
    println!("  REST:     http://localhost:{}/api/v1/", port);
    println!();
    println!("Endpoints:");
    println!("  GET /api/v1/health                        Health check");
    println!("  GET /api/v1/meta                          Dataset bounds");
    println!("  GET /api/v1/summary                       Top-level KPIs");
    println!("  GET /api/v1/reviews/describe              Descriptive statistics");
    println!("  GET /api/v1/reviews/score-distribution    Score distribution");
    println!("  GET /api/v1/reviews/status-proportion     Status split");
    println!("  GET /api/v1/reviews/avg-delivery-by-score Delivery by score");
    println!("  GET /api/v1/reviews/heatmap               Bucket x score heatmap");
    println!("  GET /api/v1/reviews/score-detail          Per-score detail");
    println!("  GET /api/v1/trends/monthly                Monthly trend");
    println!("  GET /api/v1/trends/weekday                Weekday distribution");
    println!("  GET /api/v1/geo/late-by-state             Late % per state");
    println!("  GET /api/v1/geo/delivery-by-state         Delivery per state");
    println!("  GET /api/v1/geo/top-cities                Top cities");
    println!("  GET /api/v1/geo/state-status              State status counts");
    println!("  GET /api/v1/geo/state-detail              Per-state detail");
    println!("  GET /api/v1/geo/points                    Scatter points");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut port: u16 = 8080;
    let mut reviews_path = PathBuf::from("data/orders_reviews.csv");
    let mut geo_path = PathBuf::from("data/geo_orders.csv");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                i += 1;
                if i < args.len() {
                    port = args[i].parse().unwrap_or(8080);
                }
            }
            "--reviews" => {
                i += 1;
                if i < args.len() {
                    reviews_path = PathBuf::from(&args[i]);
                }
            }
            "--geo" => {
                i += 1;
                if i < args.len() {
                    geo_path = PathBuf::from(&args[i]);
                }
            }
            _ => {}
        }
        i += 1;
    }

    print_banner(port);

    // Load once; the handle stays immutable for the process lifetime
    let dataset = Arc::new(Dataset::load(&reviews_path, &geo_path)?);

    let app = create_router(dataset);
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    tracing::info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(dataset: Arc<Dataset>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/meta", get(handlers::meta))
        .route("/api/v1/summary", get(handlers::summary))
        // Review-table views
        .route("/api/v1/reviews/describe", get(handlers::describe))
        .route(
            "/api/v1/reviews/score-distribution",
            get(handlers::score_distribution),
        )
        .route(
            "/api/v1/reviews/status-proportion",
            get(handlers::status_proportion),
        )
        .route(
            "/api/v1/reviews/avg-delivery-by-score",
            get(handlers::avg_delivery_by_score),
        )
        .route("/api/v1/reviews/heatmap", get(handlers::heatmap))
        .route("/api/v1/reviews/score-detail", get(handlers::score_detail))
        // Trends
        .route("/api/v1/trends/monthly", get(handlers::monthly_trend))
        .route("/api/v1/trends/weekday", get(handlers::weekday_distribution))
        // Geo views
        .route("/api/v1/geo/late-by-state", get(handlers::late_by_state))
        .route(
            "/api/v1/geo/delivery-by-state",
            get(handlers::delivery_by_state),
        )
        .route("/api/v1/geo/top-cities", get(handlers::top_cities))
        .route("/api/v1/geo/state-status", get(handlers::state_status))
        .route("/api/v1/geo/state-detail", get(handlers::state_detail))
        .route("/api/v1/geo/points", get(handlers::geo_points))
        .with_state(dataset)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
