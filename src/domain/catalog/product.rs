use chrono::{DateTime, Datelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub vintage_year: i32,
    pub alcohol_content: Option<Decimal>,
    pub grape_variety: Option<String>,
    pub region: Option<String>,
    pub volume: Option<i32>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub tasting_notes: Option<String>,
    pub food_pairing: Vec<String>,
    pub awards: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

pub const MIN_VINTAGE_YEAR: i32 = 1900;

/// Latest vintage accepted for a product: five years past the current one.
pub fn max_vintage_year(now: DateTime<Utc>) -> i32 {
    now.year() + 5
}

pub fn is_valid_vintage(year: i32, now: DateTime<Utc>) -> bool {
    (MIN_VINTAGE_YEAR..=max_vintage_year(now)).contains(&year)
}

/// Largest price a `NUMERIC(10, 2)` column holds.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Value as stored in a two-decimal column.
fn stored(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn is_valid_alcohol_content(value: Decimal) -> bool {
    value >= Decimal::ZERO && stored(value) <= Decimal::ONE_HUNDRED
}

pub fn is_valid_price(value: Decimal) -> bool {
    value >= Decimal::ZERO && stored(value) <= MAX_PRICE
}
