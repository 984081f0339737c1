//! Password strength rules.
//!
//! Two policies exist. Sign-up accepts 8 to 20 characters mixing upper and lower
//! case plus a digit or symbol. Changing a password from the profile is stricter
//! and requires all four character classes.

pub const MIN_LEN: usize = 8;
pub const MAX_LEN: usize = 20;

#[derive(Debug, Default, Clone, Copy)]
struct Classes {
    upper: bool,
    lower: bool,
    digit: bool,
    symbol: bool,
}

fn classes(password: &str) -> Classes {
    password.chars().fold(Classes::default(), |mut c, ch| {
        if ch.is_uppercase() {
            c.upper = true;
        } else if ch.is_lowercase() {
            c.lower = true;
        } else if ch.is_ascii_digit() {
            c.digit = true;
        } else if !ch.is_whitespace() {
            c.symbol = true;
        }
        c
    })
}

fn within_bounds(password: &str) -> bool {
    let n = password.chars().count();
    (MIN_LEN..=MAX_LEN).contains(&n)
}

pub fn is_acceptable_signup_password(password: &str) -> bool {
    let c = classes(password);
    within_bounds(password) && c.upper && c.lower && (c.digit || c.symbol)
}

pub fn is_strong_password(password: &str) -> bool {
    let c = classes(password);
    password.chars().count() >= MIN_LEN && c.upper && c.lower && c.digit && c.symbol
}
