use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WineType {
    White,
    Rose,
    Sparkling,
    Red,
}

impl WineType {
    pub const ALL: [WineType; 4] = [
        WineType::White,
        WineType::Rose,
        WineType::Sparkling,
        WineType::Red,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WineType::White => "white",
            WineType::Rose => "rose",
            WineType::Sparkling => "sparkling",
            WineType::Red => "red",
        }
    }
}

impl fmt::Display for WineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| format!("unknown wine type: {s}"))
    }
}

/// Drops repeated entries while keeping the first occurrence order.
pub fn dedup_wine_types(types: &[WineType]) -> Vec<WineType> {
    let mut out: Vec<WineType> = Vec::with_capacity(types.len());
    for t in types {
        if !out.contains(t) {
            out.push(*t);
        }
    }
    out
}

/// Customer codes are derived from the registration instant.
pub fn customer_code(at: DateTime<Utc>) -> String {
    format!("CUST-{}", at.timestamp_millis())
}

#[derive(Debug, Clone)]
pub struct Customer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub customer_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CustomerProfile {
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommunicationPreferences {
    pub receive_notifications: bool,
    pub receive_newsletter: bool,
}

impl Default for CommunicationPreferences {
    fn default() -> Self {
        Self {
            receive_notifications: true,
            receive_newsletter: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CustomerAccount {
    pub customer: Customer,
    pub profile: Option<CustomerProfile>,
    pub communication: CommunicationPreferences,
    pub wine_types: Vec<WineType>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn wine_types_parse_and_dedup() {
        assert_eq!("rose".parse::<WineType>(), Ok(WineType::Rose));
        assert!("orange".parse::<WineType>().is_err());
        let deduped = dedup_wine_types(&[WineType::Red, WineType::White, WineType::Red]);
        assert_eq!(deduped, vec![WineType::Red, WineType::White]);
    }

    #[test]
    fn code_uses_millis() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(customer_code(at), "CUST-1700000000123");
    }

    #[test]
    fn communication_defaults() {
        let prefs = CommunicationPreferences::default();
        assert!(prefs.receive_notifications);
        assert!(!prefs.receive_newsletter);
    }
}
