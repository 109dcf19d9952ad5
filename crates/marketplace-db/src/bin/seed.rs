//! # Seed Data Generator
//!
//! Populates the database with customers and products for development.
//!
//! ## Usage
//! ```bash
//! # 10 customers, 200 products (default)
//! cargo run -p marketplace-db --bin seed
//!
//! # Custom amounts
//! cargo run -p marketplace-db --bin seed -- --customers 50 --products 1000
//!
//! # Specify database path
//! cargo run -p marketplace-db --bin seed -- --db ./data/marketplace.db
//! ```
//!
//! Product names are `{base} {variant}` so they stay unique; prices and
//! stock are derived from the product index and are reproducible.

use marketplace_db::{Database, DbConfig};
use std::env;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald", "Frances", "Ken", "Margaret", "Niklaus",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Knuth", "Allen", "Thompson",
    "Hamilton", "Wirth",
];

const BASE_PRODUCTS: &[&str] = &[
    "Desk Lamp",
    "Office Chair",
    "Notebook",
    "Fountain Pen",
    "Backpack",
    "Water Bottle",
    "Headphones",
    "Keyboard",
    "Mouse Pad",
    "Monitor Stand",
    "Coffee Mug",
    "Phone Case",
    "Wall Clock",
    "Plant Pot",
    "Cable Organizer",
    "Desk Mat",
    "Bookend",
    "Sticky Notes",
    "Whiteboard",
    "Stapler",
];

const VARIANTS: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 250),
    ("Large", 500),
    ("Black", 0),
    ("White", 0),
    ("Blue", 100),
    ("Red", 100),
    ("Pro", 1500),
    ("Mini", -100),
    ("Deluxe", 2500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut customers: usize = 10;
    let mut products: usize = 200;
    let mut db_path = String::from("./marketplace_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--customers" | "-c" => {
                if i + 1 < args.len() {
                    customers = args[i + 1].parse().unwrap_or(10);
                    i += 1;
                }
            }
            "--products" | "-p" => {
                if i + 1 < args.len() {
                    products = args[i + 1].parse().unwrap_or(200);
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
                println!("Marketplace Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --customers <N>  Number of customers (default: 10)");
                println!("  -p, --products <N>   Number of products (default: 200)");
                println!("  -d, --db <PATH>      Database file path (default: ./marketplace_dev.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Marketplace Seed Data Generator");
    println!("==================================");
    println!("Database:  {}", db_path);
    println!("Customers: {}", customers);
    println!("Products:  {}", products);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await? + db.customers().count().await?;
    if existing > 0 {
        println!("⚠ Database already has data");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating customers...");

    let mut generated = 0;
    for index in 0..customers {
        let (name, email) = customer_fields(index);
        if let Err(e) = db.customers().insert(&name, &email).await {
            eprintln!("Failed to insert {}: {}", email, e);
            continue;
        }
        generated += 1;
    }
    println!("✓ Generated {} customers", generated);

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut generated = 0;
    let limit = products.min(BASE_PRODUCTS.len() * VARIANTS.len());

    for index in 0..limit {
        let (name, price_cents, quantity) = product_fields(index);
        if let Err(e) = db.products().insert(&name, price_cents, quantity).await {
            eprintln!("Failed to insert {}: {}", name, e);
            continue;
        }

        generated += 1;
        if generated % 50 == 0 {
            println!("  Generated {} products...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!("✓ Generated {} products in {:?}", generated, elapsed);
    if limit < products {
        println!("  (capped at {} unique names)", limit);
    }

    println!();
    println!("Sample products:");
    for product in db.products().list(5).await? {
        println!(
            "  {}  {:<24} {:>8}  stock {}",
            product.id,
            product.name,
            product.price(),
            product.quantity
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Name and email for the customer at `index`.
fn customer_fields(index: usize) -> (String, String) {
    let first = FIRST_NAMES[index % FIRST_NAMES.len()];
    let last = LAST_NAMES[(index / FIRST_NAMES.len()) % LAST_NAMES.len()];
    let name = format!("{} {}", first, last);
    let email = format!(
        "{}.{}{}@example.com",
        first.to_lowercase(),
        last.to_lowercase(),
        index
    );
    (name, email)
}

/// Name, price and stock for the product at `index`.
fn product_fields(index: usize) -> (String, i64, i64) {
    let base = BASE_PRODUCTS[index % BASE_PRODUCTS.len()];
    let (variant, price_addon) = VARIANTS[index / BASE_PRODUCTS.len()];

    // $4.99 - $49.99 plus variant addon
    let base_price = 499 + ((index * 37) % 4500) as i64;
    let price_cents = (base_price + price_addon).max(99);

    let quantity = (index % 51) as i64;

    (format!("{} {}", base, variant), price_cents, quantity)
}
