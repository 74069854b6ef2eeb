//! # Seed Data Generator
//!
//! Populates the database with a demo catalogue for development.
//!
//! ## Usage
//! ```bash
//! # 60 products into ./webpos.db (default)
//! cargo run -p webpos-db --bin seed
//!
//! cargo run -p webpos-db --bin seed -- --count 200 --db ./data/webpos.db
//! ```
//!
//! ## Generated Products
//! - SKU: `{CATEGORY}-{NAME}-{INDEX}`
//! - Price: 3 000 - 25 000 minor units, plus a size surcharge
//! - Cost: 55-75% of price
//! - Stock: 0 - 60

use std::env;

use anyhow::Context;
use webpos_core::NewProduct;
use webpos_db::{Database, DbConfig};

/// Product categories for demo data.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "MNM",
        &[
            "Teh Botol",
            "Air Mineral",
            "Kopi Susu",
            "Jus Jeruk",
            "Susu Coklat",
            "Minuman Isotonik",
        ],
    ),
    (
        "SNK",
        &[
            "Keripik Kentang",
            "Kacang Goreng",
            "Biskuit Coklat",
            "Wafer Keju",
            "Roti Tawar",
        ],
    ),
    (
        "RNT",
        &["Sewa PS 1 Jam", "Sewa PS 3 Jam", "Paket Malam"],
    ),
];

/// Size variants and their surcharge.
const SIZES: &[(&str, i64)] = &[("Kecil", 0), ("Sedang", 2_000), ("Besar", 4_000), ("Jumbo", 7_000)];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut db_path = String::from("./webpos.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if let Some(value) = args.get(i + 1) {
                    count = value.parse().context("--count expects a number")?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if let Some(value) = args.get(i + 1) {
                    db_path = value.clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("WebPOS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 60)");
                println!("  -d, --db <PATH>    Database file path (default: ./webpos.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("WebPOS Seed Data Generator");
    println!("==========================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("failed to open {db_path}"))?;

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("Database already has {} products, skipping.", existing);
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    let mut generated = 0;
    for product in catalogue(count) {
        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.sku, e);
            continue;
        }
        generated += 1;
    }

    println!("Generated {} products", generated);
    db.close().await;
    Ok(())
}

/// Builds `count` demo products, cycling the category and size tables.
///
/// Past the first pass, names get a batch suffix; SKUs stay unique through
/// the index.
fn catalogue(count: usize) -> Vec<NewProduct> {
    let variants: Vec<(&str, &str, &str, i64)> = CATEGORIES
        .iter()
        .flat_map(|(category, names)| {
            names.iter().flat_map(move |name| {
                SIZES
                    .iter()
                    .map(move |(size, surcharge)| (*category, *name, *size, *surcharge))
            })
        })
        .collect();

    (0..count)
        .map(|index| {
            let (category, name, size, surcharge) = variants[index % variants.len()];
            let mut product = generate_product(category, name, size, surcharge, index);
            let batch = index / variants.len();
            if batch > 0 {
                product.name = format!("{} #{}", product.name, batch + 1);
            }
            product
        })
        .collect()
}

/// Builds one demo product; `seed` makes the numbers vary deterministically.
fn generate_product(category: &str, name: &str, size: &str, surcharge: i64, seed: usize) -> NewProduct {
    let code: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect::<String>()
        .to_uppercase();

    let base_price = 3_000 + ((seed * 1_700) % 22_000) as i64;
    let price = base_price + surcharge;
    let cost_pct = 55 + (seed % 21) as i64;

    NewProduct {
        sku: format!("{}-{}-{:03}", category, code, seed),
        name: format!("{} {}", name, size),
        price,
        cost: price * cost_pct / 100,
        stock: (seed % 61) as i64,
    }
}
