use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Inventory {
    pub id: Uuid,
    pub product_id: Uuid,
    pub current_stock: i32,
    pub reserved_stock: i32,
    pub minimum_stock: i32,
    pub maximum_stock: i32,
    pub last_updated: DateTime<Utc>,
    pub updated_by: Option<String>,
}

pub const DEFAULT_MINIMUM_STOCK: i32 = 10;
pub const DEFAULT_MAXIMUM_STOCK: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockMovementKind {
    In,
    Out,
    Adjustment,
    Reserved,
    Released,
}

impl StockMovementKind {
    pub const ALL: [StockMovementKind; 5] = [
        StockMovementKind::In,
        StockMovementKind::Out,
        StockMovementKind::Adjustment,
        StockMovementKind::Reserved,
        StockMovementKind::Released,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StockMovementKind::In => "in",
            StockMovementKind::Out => "out",
            StockMovementKind::Adjustment => "adjustment",
            StockMovementKind::Reserved => "reserved",
            StockMovementKind::Released => "released",
        }
    }

    /// Stock level after applying a movement of `quantity` units to `current`.
    ///
    /// Outgoing movements never drive stock below zero. Reservations are
    /// recorded in the history but leave the on-hand count untouched.
    pub fn apply(self, current: i32, quantity: i32) -> i32 {
        match self {
            StockMovementKind::In => current.saturating_add(quantity),
            StockMovementKind::Out => current.saturating_sub(quantity).max(0),
            StockMovementKind::Adjustment => quantity,
            StockMovementKind::Reserved | StockMovementKind::Released => current,
        }
    }
}

impl fmt::Display for StockMovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMovementKind(pub String);

impl fmt::Display for UnknownMovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown stock movement type: {}", self.0)
    }
}

impl std::error::Error for UnknownMovementKind {}

impl FromStr for StockMovementKind {
    type Err = UnknownMovementKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownMovementKind(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub kind: StockMovementKind,
    pub quantity: i32,
    pub previous_stock: i32,
    pub new_stock: i32,
    pub reason: Option<String>,
    pub reference_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
}
