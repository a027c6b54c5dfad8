//! Simulated product catalog.
//!
//! Titles and placeholder images for generated orders. Purely cosmetic; the
//! engine only cares about amounts and rates.

use super::models::{StoreTier, TaskItem};
use crate::money::round2;
use rand::Rng;
use rand::seq::IndexedRandom;

const AMAZON_TITLES: &[&str] = &[
    "Wireless Earbuds Pro",
    "Stainless Travel Mug 16oz",
    "LED Desk Lamp",
    "Yoga Mat Non-Slip",
    "USB-C Fast Charger 65W",
    "Memory Foam Pillow",
    "Bluetooth Speaker Mini",
    "Electric Kettle 1.7L",
];

const ALIBABA_TITLES: &[&str] = &[
    "Smart Watch Fitness Band (50 pcs)",
    "Phone Case Bulk Lot",
    "Solar Garden Lights (24 pack)",
    "Kitchen Knife Set Wholesale",
    "Cotton T-Shirt Blanks (100 pcs)",
    "LED Strip Lights Roll",
];

const ALIEXPRESS_TITLES: &[&str] = &[
    "Drone 4K Camera Foldable",
    "Mechanical Keyboard RGB",
    "Robot Vacuum Cleaner",
    "Projector 1080p Home Cinema",
    "Electric Scooter Battery Pack",
    "Espresso Machine 20 Bar",
];

/// Placeholder image URL derived from a stable seed
pub fn image_url(seed: &str) -> String {
    let slug: String = seed
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(24)
        .collect::<String>()
        .to_lowercase();
    format!("https://picsum.photos/seed/{slug}/200/200")
}

/// Pick a random product title for a tier
pub fn sample_title<R: Rng + ?Sized>(store: StoreTier, rng: &mut R) -> &'static str {
    let titles = match store {
        StoreTier::Amazon => AMAZON_TITLES,
        StoreTier::Alibaba => ALIBABA_TITLES,
        StoreTier::Aliexpress => ALIEXPRESS_TITLES,
    };
    titles.choose(rng).copied().unwrap_or("Assorted Goods")
}

/// Split an order amount into `count` product lines that sum back to it
pub fn split_items<R: Rng + ?Sized>(
    store: StoreTier,
    total: f64,
    count: usize,
    rng: &mut R,
) -> Vec<TaskItem> {
    let count = count.max(1);
    let even = round2(total / count as f64);
    let mut items = Vec::with_capacity(count);
    let mut allocated = 0.0;

    for i in 0..count {
        // Last line absorbs the rounding remainder
        let unit_price = if i == count - 1 {
            round2(total - allocated)
        } else {
            even
        };
        allocated = round2(allocated + unit_price);

        let title = sample_title(store, rng);
        items.push(TaskItem {
            title: title.to_string(),
            image: image_url(title),
            unit_price,
            quantity: 1,
        });
    }
    items
}
