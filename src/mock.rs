// src/mock.rs

//! Deterministic mock catalog for demos and tests

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::catalog::Product;

const BRANDS: &[&str] = &[
    "Nike", "Adidas", "Zara", "H&M", "Puma", "Levi's", "Mango", "Uniqlo",
];

const CATEGORIES: &[(&str, &[&str])] = &[
    ("women/dresses", &["maxi", "midi", "mini"]),
    ("women/tops", &["blouse", "t-shirt", "tank"]),
    ("men/shirts", &["oxford", "polo", "t-shirt"]),
    ("men/shoes", &["sneakers", "loafers", "boots"]),
    ("kids/outerwear", &["parka", "raincoat"]),
    ("accessories/bags", &["tote", "backpack", "clutch"]),
];

const COLORS: &[&str] = &[
    "black", "white", "red", "navy", "green", "beige", "pink", "grey", "yellow",
];

const APPAREL_SIZES: &[&str] = &["XS", "S", "M", "L", "XL"];
const SHOE_SIZES: &[&str] = &["38", "39", "40", "41", "42", "43", "44"];
const ONE_SIZE: &[&str] = &["one-size"];

const STYLE_WORDS: &[&str] = &[
    "casual", "formal", "sport", "classic", "modern", "vintage", "elegant", "streetwear",
];
const OCCASION_WORDS: &[&str] = &[
    "wedding", "party", "work", "beach", "travel", "everyday", "evening", "gym",
];

/// Generates `count` products; the same seed always yields the same catalog.
pub fn generate_catalog(count: usize, seed: u64) -> Vec<Product> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|i| generate_product(&mut rng, i)).collect()
}

fn generate_product(rng: &mut StdRng, index: usize) -> Product {
    let brand = pick(rng, BRANDS);
    let (category, types) = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
    let product_type = pick(rng, types);

    let color_count = rng.gen_range(1..=3);
    let colors: Vec<&str> = COLORS.choose_multiple(rng, color_count).copied().collect();

    let size_pool = if category.ends_with("shoes") {
        SHOE_SIZES
    } else if category.starts_with("accessories") {
        ONE_SIZE
    } else {
        APPAREL_SIZES
    };
    let start = rng.gen_range(0..size_pool.len());
    let end = rng.gen_range(start + 1..=size_pool.len());

    let price = rng.gen_range(500..=50_000) as f64 / 100.0;
    let description = format!(
        "A {} {} by {}, made for {} and {}.",
        pick(rng, STYLE_WORDS),
        product_type,
        brand,
        pick(rng, OCCASION_WORDS),
        pick(rng, OCCASION_WORDS),
    );

    Product::new(
        format!("{:05}", index + 1),
        format!("{} {} {}", brand, colors[0], product_type),
        price,
    )
    .brand(brand)
    .category(category)
    .colors(colors)
    .sizes(size_pool[start..end].iter().copied())
    .types([product_type])
    .description(description)
}

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
    values[rng.gen_range(0..values.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogSnapshot;

    #[test]
    fn test_same_seed_same_catalog() {
        assert_eq!(generate_catalog(25, 42), generate_catalog(25, 42));
        assert_ne!(generate_catalog(25, 42), generate_catalog(25, 43));
    }

    #[test]
    fn test_generated_products_are_well_formed() {
        let products = generate_catalog(200, 3);
        assert_eq!(products.len(), 200);
        for product in &products {
            assert!(!product.colors.is_empty());
            assert!(!product.sizes.is_empty());
            assert!((5.0..=500.0).contains(&product.price));
            assert!(!product.description.is_empty());
        }
        assert!(CatalogSnapshot::new(products).is_ok());
    }

    #[test]
    fn test_zero_count() {
        assert!(generate_catalog(0, 1).is_empty());
    }
}
