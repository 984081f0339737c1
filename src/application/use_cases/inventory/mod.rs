pub mod movements;
pub mod stock_levels;
