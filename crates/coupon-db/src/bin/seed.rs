//! # Seed Data Generator
//!
//! Populates the database with test sites and coupons for development.
//!
//! ## Usage
//! ```bash
//! # Seed defaults (3 sites, 12 coupons per site)
//! cargo run -p coupon-db --bin seed
//!
//! # Custom amounts
//! cargo run -p coupon-db --bin seed -- --sites 5 --coupons 20
//!
//! # Specify database path
//! cargo run -p coupon-db --bin seed -- --db ./data/coupons.db
//! ```
//!
//! ## Generated Data
//! Each site gets a mix of:
//! - Percentage coupons (5-50% off)
//! - Fixed coupons ($5-$50 off)
//! - Some with minimum purchase thresholds
//! - Some with usage caps
//! - One expired and one not-yet-valid coupon for eligibility testing

use chrono::{Duration, Utc};
use std::env;
use uuid::Uuid;

use coupon_core::{normalize_code, Coupon, DiscountType, Site};
use coupon_db::{Database, DbConfig};

/// Code stems combined with an index to produce unique per-site codes.
const CODE_STEMS: &[&str] = &[
    "WELCOME", "SUMMER", "SPRING", "AUTUMN", "WINTER", "FLASH", "VIP", "LOYALTY", "LAUNCH",
    "WEEKEND", "HOLIDAY", "EARLYBIRD",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut site_count: usize = 3;
    let mut coupons_per_site: usize = 12;
    let mut db_path = String::from("./coupons_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sites" | "-s" => {
                if i + 1 < args.len() {
                    site_count = args[i + 1].parse().unwrap_or(3);
                    i += 1;
                }
            }
            "--coupons" | "-c" => {
                if i + 1 < args.len() {
                    coupons_per_site = args[i + 1].parse().unwrap_or(12);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Coupon Service Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --sites <N>    Number of sites to generate (default: 3)");
                println!("  -c, --coupons <N>  Coupons per site (default: 12)");
                println!("  -d, --db <PATH>    Database file path (default: ./coupons_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Coupon Service Seed Data Generator");
    println!("=====================================");
    println!("Database: {}", db_path);
    println!("Sites:    {}", site_count);
    println!("Coupons:  {} per site", coupons_per_site);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let mut total_coupons = 0;
    let start = std::time::Instant::now();

    for site_idx in 0..site_count {
        let site = Site {
            id: Uuid::new_v4().to_string(),
            user_id: format!("user-{:03}", site_idx + 1),
            name: format!("Demo Shop {}", site_idx + 1),
            created_at: Utc::now(),
        };
        db.sites().insert(&site).await?;

        for coupon_idx in 0..coupons_per_site {
            let coupon = generate_coupon(&site, coupon_idx);
            if let Err(e) = db.coupons().insert(&coupon).await {
                eprintln!("Failed to insert {}: {}", coupon.code, e);
                continue;
            }
            total_coupons += 1;
        }

        println!("  Seeded site {} ({})", site.name, site.id);
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "✓ Generated {} sites and {} coupons in {:?}",
        site_count, total_coupons, elapsed
    );
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single coupon with varied, realistic rules.
fn generate_coupon(site: &Site, seed: usize) -> Coupon {
    let now = Utc::now();
    let stem = CODE_STEMS[seed % CODE_STEMS.len()];
    let code = normalize_code(&format!("{}{}", stem, 5 + (seed * 5) % 50));

    // Alternate kinds: even = percentage, odd = fixed
    let (discount_type, discount_value) = if seed % 2 == 0 {
        (DiscountType::Percentage, (5 + (seed * 5) % 46) as i64)
    } else {
        (DiscountType::Fixed, (500 + (seed * 700) % 4_500) as i64)
    };

    // Every third coupon requires a minimum purchase
    let min_purchase_cents = if seed % 3 == 0 {
        Some((2_000 + (seed * 1_000) % 8_000) as i64)
    } else {
        None
    };

    // Every fourth coupon is capped
    let max_uses = if seed % 4 == 0 {
        Some((10 + seed % 90) as i64)
    } else {
        None
    };

    // Most coupons are live; sprinkle one expired and one future window
    // per dozen for eligibility testing
    let (valid_from, valid_until) = match seed % 12 {
        0 => (now - Duration::days(60), now - Duration::days(30)), // expired
        1 => (now + Duration::days(7), now + Duration::days(37)),  // upcoming
        _ => (now - Duration::days(1), now + Duration::days(30)),  // live
    };

    Coupon {
        id: Uuid::new_v4().to_string(),
        site_id: site.id.clone(),
        user_id: site.user_id.clone(),
        code,
        discount_type,
        discount_value,
        min_purchase_cents,
        max_uses,
        used_count: 0,
        valid_from,
        valid_until,
        is_active: seed % 7 != 6, // one in seven is deactivated
        created_at: now,
        updated_at: now,
    }
}
