//! # Catalog Seed Generator
//!
//! Populates the `products` table with sample catalog entries for
//! development, so add-to-cart can be exercised without sending a price.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p bazaar-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p bazaar-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p bazaar-db --bin seed -- --db ./data/bazaar.db
//! ```
//!
//! ## Generated Products
//! Each product has:
//! - Id: `{CATEGORY}-{INDEX}` (e.g. `HOME-0042`)
//! - Name: `{item} {variant}`
//! - Price: $4.99 - $129.99
//! - Every 13th product is marked unavailable

use std::env;

use bazaar_core::{CatalogEntry, Money};
use bazaar_db::{Database, DbConfig};

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "HOME",
        &[
            "Desk Lamp",
            "Throw Pillow",
            "Wall Clock",
            "Scented Candle",
            "Picture Frame",
            "Storage Basket",
        ],
    ),
    (
        "KITCH",
        &[
            "Chef Knife",
            "Cutting Board",
            "French Press",
            "Mixing Bowl",
            "Cast Iron Skillet",
            "Tea Kettle",
        ],
    ),
    (
        "TECH",
        &[
            "USB-C Cable",
            "Wireless Mouse",
            "Laptop Stand",
            "Bluetooth Speaker",
            "Phone Charger",
            "Webcam",
        ],
    ),
    (
        "OUT",
        &[
            "Water Bottle",
            "Camping Lantern",
            "Trail Backpack",
            "Picnic Blanket",
            "Folding Chair",
            "Hammock",
        ],
    ),
];

/// Variants with their price addon in cents
const VARIANTS: &[(&str, i64)] = &[
    ("Basic", 0),
    ("Classic", 500),
    ("Deluxe", 1500),
    ("Pro", 3000),
    ("Mini", -200),
    ("XL", 2000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./bazaar_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
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
                println!("Bazaar Catalog Seed Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./bazaar_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bazaar Catalog Seed Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    'outer: for (category, items) in CATEGORIES {
        for item in items.iter() {
            for (variant, price_addon) in VARIANTS {
                if generated >= count {
                    break 'outer;
                }

                let entry = generate_product(category, item, variant, *price_addon, generated);

                if let Err(e) = db.products().upsert(&entry).await {
                    eprintln!("Failed to insert {}: {}", entry.product_id, e);
                    continue;
                }

                generated += 1;
            }
        }
    }

    println!();
    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    let sample = db.products().list(5).await?;
    for entry in &sample {
        println!("  {:<12} {:<28} {}", entry.product_id, entry.name, entry.unit_price);
    }

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single catalog entry.
fn generate_product(
    category: &str,
    item: &str,
    variant: &str,
    price_addon: i64,
    seed: usize,
) -> CatalogEntry {
    // Base price $4.99 - $99.99
    let base_price = 499 + ((seed * 37) % 9500) as i64;

    CatalogEntry {
        product_id: format!("{}-{:04}", category, seed),
        name: format!("{} {}", item, variant),
        unit_price: Money::from_cents((base_price + price_addon).max(99)),
        available: seed % 13 != 12,
    }
}
