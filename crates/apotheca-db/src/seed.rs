//! # Seed Data Generator
//!
//! Populates an empty database with pharmacy items for development.
//!
//! ## Generated Items
//! Names combine a product with a pack size across categories:
//! - Analgesics (paracetamol, ibuprofen, ...)
//! - Cold & flu (cough syrup, lozenges, ...)
//! - Vitamins (vitamin C, zinc, ...)
//! - First aid (bandages, antiseptic, ...)
//!
//! Each item gets:
//! - Price: 1.49 - 24.99, derived from its index (deterministic)
//! - Stock: 0 - 100

use apotheca_core::{Money, NewItem};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::DbResult;
use crate::pool::Database;

/// Item categories for realistic test data.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Analgesics",
        &[
            "Paracetamol 500mg",
            "Ibuprofen 200mg",
            "Ibuprofen 400mg",
            "Aspirin 300mg",
            "Naproxen 250mg",
            "Diclofenac Gel",
        ],
    ),
    (
        "Cold & Flu",
        &[
            "Cough Syrup",
            "Throat Lozenges",
            "Nasal Spray",
            "Decongestant Tablets",
            "Vapour Rub",
            "Saline Drops",
        ],
    ),
    (
        "Vitamins",
        &[
            "Vitamin C 1000mg",
            "Vitamin D3",
            "Zinc Tablets",
            "Multivitamin",
            "Iron Supplement",
            "Omega-3 Capsules",
        ],
    ),
    (
        "First Aid",
        &[
            "Bandage Roll",
            "Adhesive Plasters",
            "Antiseptic Cream",
            "Sterile Gauze",
            "Surgical Tape",
            "Burn Gel",
        ],
    ),
];

/// Pack sizes appended to item names.
const PACKS: &[&str] = &["x10", "x20", "x30", "100ml", "200ml"];

/// Outcome of a seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Items inserted by this run.
    pub inserted: usize,
    /// Items that were already present (seeding is skipped when non-zero).
    pub existing: i64,
}

/// Inserts up to `count` items, unless the database already has items.
pub async fn seed_items(db: &Database, count: usize) -> DbResult<SeedReport> {
    let existing = db.items().count().await?;
    if existing > 0 {
        warn!(existing = existing, "Database already has items, skipping seed");
        return Ok(SeedReport {
            inserted: 0,
            existing,
        });
    }

    let items = db.items();
    let mut inserted = 0;

    'outer: for (category, names) in CATEGORIES {
        for name in names.iter() {
            for pack in PACKS {
                if inserted >= count {
                    break 'outer;
                }
                let item = generate_item(name, pack, inserted);
                items.insert(&item).await?;
                inserted += 1;
            }
        }
        info!(category = %category, inserted = inserted, "Seeded category");
    }

    info!(inserted = inserted, "Seed complete");
    Ok(SeedReport {
        inserted,
        existing: 0,
    })
}

/// Builds one item with deterministic price and stock.
fn generate_item(name: &str, pack: &str, seed: usize) -> NewItem {
    // 149..=2499 hundredths
    let hundredths = 149 + ((seed * 37) % 2351) as i64;

    NewItem {
        name: format!("{name} {pack}"),
        price: Money::from_decimal(Decimal::new(hundredths, 2)),
        stock_quantity: (seed % 101) as i64,
    }
}

/// Most items [`seed_items`] can generate.
pub fn max_seed_items() -> usize {
    CATEGORIES
        .iter()
        .map(|(_, names)| names.len() * PACKS.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;

    #[test]
    fn test_generate_item_price_range() {
        for seed in 0..500 {
            let item = generate_item("Paracetamol 500mg", "x10", seed);
            assert!(item.price >= Money::parse("1.49").unwrap());
            assert!(item.price <= Money::parse("24.99").unwrap());
            assert!((0..=100).contains(&item.stock_quantity));
        }
    }

    #[tokio::test]
    async fn test_seed_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = seed_items(&db, 25).await.unwrap();
        assert_eq!(first.inserted, 25);
        assert_eq!(db.items().count().await.unwrap(), 25);

        let second = seed_items(&db, 25).await.unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.existing, 25);
    }

    #[tokio::test]
    async fn test_seed_caps_at_catalogue_size() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let report = seed_items(&db, usize::MAX).await.unwrap();
        assert_eq!(report.inserted, max_seed_items());
    }
}
