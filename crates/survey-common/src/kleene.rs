//! Three-valued boolean logic for nullable indicator columns.
//!
//! Mirrors the Kleene semantics Polars applies to `Boolean` columns with
//! nulls: `true OR null = true`, `false AND null = false`, anything else
//! involving null stays null.

pub fn kleene_or(left: Option<bool>, right: Option<bool>) -> Option<bool> {
    match (left, right) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

pub fn kleene_and(left: Option<bool>, right: Option<bool>) -> Option<bool> {
    match (left, right) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

pub fn kleene_not(value: Option<bool>) -> Option<bool> {
    value.map(|v| !v)
}
