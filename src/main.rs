//! Brasil E-Commerce delivery dashboard - CLI front end
//!
//! Loads the two CSV tables, applies the selected filters, and prints the
//! thematic views as text tables.
//!
//! Run: ./target/release/dashboard [section] [options]
//! Sections: all, overview, delivery, geo, trend

use anyhow::Result;
use brasil_ecommerce::aggregates;
use brasil_ecommerce::dataset::Dataset;
use brasil_ecommerce::filters::{filter_geo, filter_reviews, GeoFilter, ReviewFilter};
use brasil_ecommerce::models::{GeoOrder, OrderReview, StatusFilter};
use brasil_ecommerce::state_names::get_state_name;
use brasil_ecommerce::stats;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(about = "Brasil e-commerce delivery analytics")]
struct Args {
    /// Section to print: all, overview, delivery, geo, trend
    #[arg(default_value = "all")]
    section: String,

    /// Orders-reviews CSV path
    #[arg(long, default_value = "data/orders_reviews.csv")]
    reviews: PathBuf,

    /// Geo-orders CSV path
    #[arg(long, default_value = "data/geo_orders.csv")]
    geo: PathBuf,

    /// Purchase-date lower bound (YYYY-MM-DD); needs --to to take effect
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Purchase-date upper bound (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Minimum review score
    #[arg(long, default_value = "1")]
    min_score: u8,

    /// Maximum review score
    #[arg(long, default_value = "5")]
    max_score: u8,

    /// Minimum delivery time in days
    #[arg(long, default_value = "0")]
    min_days: f64,

    /// Maximum delivery time in days
    #[arg(long, default_value = "60")]
    max_days: f64,

    /// Delivery status: all, on_time, late
    #[arg(long, default_value = "all")]
    status: String,

    /// Comma-separated UF codes (default: every observed state)
    #[arg(long)]
    states: Option<String>,

    /// How many cities in the top-cities ranking (5-20)
    #[arg(long, default_value = "10")]
    top_cities: usize,
}

fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(80));
    println!("  {}", title);
    println!("{}\n", "═".repeat(80));
}

fn print_subsection(title: &str) {
    println!("\n{}", title);
    println!("{}", "─".repeat(70));
}

fn fmt_opt(v: Option<f64>, precision: usize) -> String {
    match v {
        Some(x) => format!("{:.*}", precision, x),
        None => "N/A".to_string(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let dataset = Dataset::load(&args.reviews, &args.geo)?;

    let review_filter = ReviewFilter {
        date_range: args.from.zip(args.to),
        score_range: (args.min_score, args.max_score),
        delivery_range: (args.min_days, args.max_days),
        status: StatusFilter::from(args.status.as_str()),
    };
    let geo_filter = GeoFilter {
        states: match &args.states {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => dataset.state_codes().into_iter().collect(),
        },
        status: StatusFilter::from(args.status.as_str()),
        delivery_range: (args.min_days, args.max_days),
    };

    let reviews = filter_reviews(&dataset.reviews, &review_filter);
    let geo = filter_geo(&dataset.geo, &geo_filter);

    println!("\n{}", "█".repeat(80));
    println!(
        "{}  BRASIL E-COMMERCE DELIVERY ANALYTICS  {}",
        "█".repeat(18),
        "█".repeat(19)
    );
    println!("{}", "█".repeat(80));

    match args.section.as_str() {
        "all" => {
            run_overview_section(&reviews);
            run_delivery_section(&reviews);
            run_geo_section(&geo, args.top_cities);
            run_trend_section(&reviews);
        }
        "overview" => run_overview_section(&reviews),
        "delivery" => run_delivery_section(&reviews),
        "geo" => run_geo_section(&geo, args.top_cities),
        "trend" => run_trend_section(&reviews),
        other => {
            println!("Unknown section: {}", other);
            println!("Available: all, overview, delivery, geo, trend");
        }
    }

    println!("\n{}", "█".repeat(80));
    Ok(())
}

fn run_overview_section(reviews: &[OrderReview]) {
    print_section_header("1. OVERVIEW");

    print_subsection("Key Metrics");
    let m = aggregates::summary_metrics(reviews);
    println!("  Total Orders:         {:>12}", m.total);
    println!("  Avg Delivery:         {:>12} days", fmt_opt(m.mean_delivery, 1));
    println!("  Median Delivery:      {:>12} days", fmt_opt(m.median_delivery, 1));
    println!("  Avg Review Score:     {:>12}", fmt_opt(m.mean_score, 2));
    println!("  Delivery/Score Corr:  {:>12}", fmt_opt(m.correlation, 3));
    println!("  Late Deliveries:      {:>11}%", fmt_opt(m.late_pct, 1));

    print_subsection("Review Score Distribution");
    let dist = aggregates::score_distribution(reviews);
    let max_count = dist.iter().map(|s| s.count).max().unwrap_or(1) as f64;
    for entry in &dist {
        let bar_len = ((entry.count as f64 / max_count) * 40.0) as usize;
        let bar: String = "█".repeat(bar_len);
        println!("  Score {}  {:>8}  {}", entry.score, entry.count, bar);
    }

    print_subsection("Delivery Status");
    for share in aggregates::status_proportion(reviews) {
        let bar_len = (share.pct / 2.0) as usize;
        let bar: String = "█".repeat(bar_len);
        println!(
            "  {:8} {:>8} ({:>5.1}%) {}",
            share.status, share.count, share.pct, bar
        );
    }

    print_subsection("Descriptive Statistics");
    let times: Vec<f64> = reviews.iter().map(|r| r.delivery_time).collect();
    let scores: Vec<f64> = reviews.iter().map(|r| r.review_score as f64).collect();
    println!(
        "  {:14} {:>7} {:>8} {:>8} {:>7} {:>7} {:>7} {:>7} {:>7}",
        "", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max"
    );
    println!("  {}", "─".repeat(74));
    for (label, d) in [
        ("Delivery Time", stats::describe(&times)),
        ("Review Score", stats::describe(&scores)),
    ] {
        println!(
            "  {:14} {:>7} {:>8} {:>8} {:>7} {:>7} {:>7} {:>7} {:>7}",
            label,
            d.count,
            fmt_opt(d.mean, 2),
            fmt_opt(d.std, 2),
            fmt_opt(d.min, 1),
            fmt_opt(d.q1, 1),
            fmt_opt(d.median, 1),
            fmt_opt(d.q3, 1),
            fmt_opt(d.max, 1)
        );
    }
}

fn run_delivery_section(reviews: &[OrderReview]) {
    print_section_header("2. DELIVERY ANALYSIS");

    print_subsection("Delivery Time Distribution");
    let marks = aggregates::delivery_stats(reviews);
    println!("  Mean:   {:>8} days", fmt_opt(marks.mean, 1));
    println!("  Median: {:>8} days", fmt_opt(marks.median, 1));

    print_subsection("Avg Delivery Time by Review Score");
    let by_score = aggregates::avg_delivery_by_score(reviews);
    println!("  {:>6} {:>8} {:>12}", "Score", "Orders", "Avg Days");
    println!("  {}", "─".repeat(30));
    for entry in &by_score.per_score {
        println!(
            "  {:>6} {:>8} {:>12.1}",
            entry.score, entry.count, entry.avg_delivery
        );
    }
    println!(
        "  Overall mean: {} days",
        fmt_opt(by_score.overall, 1)
    );

    print_subsection("Score x Delivery Time Heatmap (order counts)");
    let hm = aggregates::score_heatmap(reviews);
    if hm.scores.is_empty() {
        println!("  (no rows)");
    } else {
        print!("  {:8}", "Days");
        for score in &hm.scores {
            print!(" {:>8}", format!("Score {}", score));
        }
        println!();
        println!("  {}", "─".repeat(8 + 9 * hm.scores.len()));
        for (bucket, row) in hm.buckets.iter().zip(&hm.counts) {
            print!("  {:8}", bucket);
            for count in row {
                print!(" {:>8}", count);
            }
            println!();
        }
    }

    print_subsection("Detail by Review Score");
    print_detail_table("Score", &aggregates::score_detail(reviews));
}

fn run_geo_section(geo: &[GeoOrder], top_n: usize) {
    print_section_header("3. GEOGRAPHIC ANALYSIS");

    print_subsection("Late Percentage by State");
    let late = aggregates::late_percentage_by_state(geo);
    println!("  {:6} {:>8} {:>8} {:>8}", "State", "Orders", "Late", "Late%");
    println!("  {}", "─".repeat(36));
    for s in &late.states {
        println!(
            "  {:6} {:>8} {:>8} {:>7.1}%",
            s.state, s.total, s.late, s.late_pct
        );
    }
    println!(
        "  Mean of state percentages: {}%",
        fmt_opt(late.mean_pct, 1)
    );

    print_subsection("On-Time vs Late by State");
    println!("  {:6} {:>8} {:>8} {:>8}", "State", "On Time", "Late", "Total");
    println!("  {}", "─".repeat(36));
    for s in aggregates::state_status_counts(geo) {
        println!(
            "  {:6} {:>8} {:>8} {:>8}",
            s.state, s.on_time, s.late, s.total
        );
    }

    print_subsection("Avg Delivery Time by State (>=100 orders)");
    let by_state = aggregates::delivery_time_by_state(geo);
    println!("  {:22} {:>8} {:>10}", "State", "Orders", "Avg Days");
    println!("  {}", "─".repeat(44));
    for s in &by_state.states {
        println!(
            "  {:22} {:>8} {:>10.1}",
            get_state_name(&s.state),
            s.count,
            s.avg_delivery
        );
    }
    println!("  National mean: {} days", fmt_opt(by_state.overall, 1));

    print_subsection("Top Cities by Order Count");
    let cities = aggregates::top_cities(geo, top_n);
    let max_count = cities.iter().map(|c| c.count).max().unwrap_or(1) as f64;
    for c in &cities {
        let bar_len = ((c.count as f64 / max_count) * 30.0) as usize;
        let bar: String = "▓".repeat(bar_len);
        println!("  {:24} {:>8}  {}", c.city, c.count, bar);
    }

    print_subsection("Detail by State");
    print_detail_table("State", &aggregates::state_detail(geo));
}

fn run_trend_section(reviews: &[OrderReview]) {
    print_section_header("4. TREND ANALYSIS");

    print_subsection("Monthly Trend");
    let monthly = aggregates::monthly_trend(reviews);
    if monthly.is_empty() {
        println!("  No purchase timestamps available for trend analysis");
        return;
    }
    let max_orders = monthly.iter().map(|m| m.orders).max().unwrap_or(1) as f64;
    println!(
        "  {:10} {:>8} {:>10} {:>10} {:>8}  {}",
        "Month", "Orders", "Avg Days", "Avg Score", "Late%", "Volume"
    );
    println!("  {}", "─".repeat(72));
    for m in &monthly {
        let bar_len = ((m.orders as f64 / max_orders) * 20.0) as usize;
        let bar: String = "▓".repeat(bar_len);
        println!(
            "  {:10} {:>8} {:>10.1} {:>10.2} {:>7.1}%  {}",
            m.month, m.orders, m.avg_delivery, m.avg_score, m.late_pct, bar
        );
    }

    print_subsection("Orders by Day of Week");
    let weekdays = aggregates::weekday_distribution(reviews);
    let max_count = weekdays.iter().map(|d| d.count).max().unwrap_or(1) as f64;
    for d in &weekdays {
        let bar_len = ((d.count as f64 / max_count) * 30.0) as usize;
        let bar: String = "█".repeat(bar_len);
        println!("  {:10} {:>8}  {}", d.day, d.count, bar);
    }
}

fn print_detail_table(key: &str, rows: &[aggregates::DeliveryDetail]) {
    println!(
        "  {:6} {:>7} {:>8} {:>8} {:>8} {:>7} {:>7} {:>7} {:>7}",
        key, "Count", "Mean", "Median", "Std", "Min", "Max", "Late", "Late%"
    );
    println!("  {}", "─".repeat(74));
    for r in rows {
        println!(
            "  {:6} {:>7} {:>8.2} {:>8.2} {:>8} {:>7.1} {:>7.1} {:>7} {:>6.1}%",
            r.label,
            r.count,
            r.mean,
            r.median,
            fmt_opt(r.std, 2),
            r.min,
            r.max,
            r.late,
            r.late_pct
        );
    }
}
