//! # Seed Data Generator
//!
//! Populates the local product cache with test data for development, so the
//! point-of-sale screen has something to sell before the first remote
//! refresh happens.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p cloudpos-store --bin seed
//!
//! # Custom database path and store id
//! cargo run -p cloudpos-store --bin seed -- --db ./pos_dev.db --store store-1
//! ```

use std::env;

use cloudpos_core::{CachedProduct, Money};
use cloudpos_store::{LocalStore, StoreConfig};
use uuid::Uuid;

/// (category, name, price in cents) triples for realistic cache contents.
const PRODUCTS: &[(&str, &str, i64)] = &[
    ("beverages", "Coca-Cola 330ml", 199),
    ("beverages", "Orange Juice 1L", 349),
    ("beverages", "Sparkling Water", 129),
    ("beverages", "Cold Brew Coffee", 449),
    ("snacks", "Potato Chips", 299),
    ("snacks", "Chocolate Bar", 179),
    ("snacks", "Trail Mix", 399),
    ("snacks", "Pretzels", 249),
    ("dairy", "Whole Milk 1L", 289),
    ("dairy", "Greek Yogurt", 159),
    ("dairy", "Cheddar Block", 549),
    ("grocery", "Sourdough Loaf", 429),
    ("grocery", "Spaghetti 500g", 189),
    ("grocery", "Peanut Butter", 379),
    ("grocery", "Honey Jar", 599),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./cloudpos_dev.db");
    let mut store_id = String::from("store-1");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--store" | "-s" => {
                if i + 1 < args.len() {
                    store_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("CloudPOS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>     Database file path (default: ./cloudpos_dev.db)");
                println!("  -s, --store <ID>    Store id for seeded products (default: store-1)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 CloudPOS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Store:    {}", store_id);
    println!();

    let store = LocalStore::open(StoreConfig::new(&db_path)).await?;

    println!("✓ Local store opened, migrations applied");

    let products: Vec<CachedProduct> = PRODUCTS
        .iter()
        .map(|(category, name, price_cents)| CachedProduct {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.clone(),
            name: (*name).to_string(),
            price: Money::from_cents(*price_cents),
            stock_quantity: 50,
            category: (*category).to_string(),
        })
        .collect();

    // Wholesale replacement, same as a real refresh from the remote source
    store.products().replace_all(&products).await?;

    let cached = store.products().list_for_store(&store_id).await?;
    println!("✓ Seeded {} products", cached.len());

    let pending = store.pending_sales().count_unsynced().await?;
    println!("  Pending sales in queue: {}", pending);

    store.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
