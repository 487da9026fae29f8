//! # Demo Catalog Seeder
//!
//! Populates a store with a small Brazilian grocery catalog for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p pdv-store --bin seed
//!
//! # Specify database path
//! cargo run -p pdv-store --bin seed -- --db ./data/pdv.db
//!
//! # Multiply each product into size variants
//! cargo run -p pdv-store --bin seed -- --variants 3
//! ```
//!
//! Codes are synthetic EAN-13 style (`789` + sequence), so `scan 7890000000017`
//! in the `pdv` terminal is a barcode hit.

use std::env;

use pdv_core::{CatalogEntry, Money};
use pdv_store::{Database, DbConfig, Repository};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (name, price in centavos, stock)
const PRODUCTS: &[(&str, i64, i64)] = &[
    ("Arroz Branco 5kg", 2790, 40),
    ("Feijao Carioca 1kg", 899, 55),
    ("Acucar Refinado 1kg", 489, 60),
    ("Cafe Torrado 500g", 1849, 30),
    ("Oleo de Soja 900ml", 749, 48),
    ("Leite Integral 1L", 529, 120),
    ("Manteiga 200g", 1290, 18),
    ("Pao de Forma", 899, 25),
    ("Macarrao Espaguete 500g", 459, 70),
    ("Molho de Tomate 340g", 279, 90),
    ("Farinha de Mandioca 1kg", 699, 22),
    ("Sal Refinado 1kg", 249, 35),
    ("Refrigerante Cola 2L", 999, 64),
    ("Agua Mineral 500ml", 250, 200),
    ("Suco de Laranja 1L", 799, 12),
    ("Biscoito Recheado", 349, 80),
    ("Sabao em Po 1kg", 1399, 16),
    ("Detergente 500ml", 259, 44),
    ("Papel Higienico 12un", 2199, 20),
    ("Creme Dental 90g", 499, 0),
];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pdv_store=debug,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// EAN-13 style code with a valid check digit.
fn ean13(sequence: usize) -> String {
    let body = format!("789{:09}", sequence);
    let sum: u32 = body
        .chars()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d } else { d * 3 })
        .sum();
    format!("{}{}", body, (10 - sum % 10) % 10)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./pdv_dev.db");
    let mut variants: usize = 1;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if let Some(path) = args.get(i + 1) {
                    db_path = path.clone();
                    i += 1;
                }
            }
            "--variants" | "-v" => {
                if let Some(n) = args.get(i + 1) {
                    variants = n.parse::<usize>().unwrap_or(1).max(1);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("PDV Demo Catalog Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (default: ./pdv_dev.db)");
                println!("  -v, --variants <N>     Copies of each product (default: 1)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let catalog = db.records::<CatalogEntry>();

    let existing = catalog.count().await?;
    if existing > 0 {
        info!(existing, "Catalog already seeded, skipping");
        return Ok(());
    }

    let mut sequence = 0;
    for variant in 0..variants {
        for (name, cents, stock) in PRODUCTS {
            sequence += 1;
            let name = if variant == 0 {
                name.to_string()
            } else {
                format!("{} ({})", name, variant + 1)
            };

            let entry = CatalogEntry::new(
                sequence.to_string(),
                ean13(sequence),
                name,
                Money::from_cents(*cents),
                *stock,
            )?;
            catalog.put(&entry).await?;
        }
    }

    info!(path = %db_path, products = sequence, "Seed complete");
    db.close().await;
    Ok(())
}
