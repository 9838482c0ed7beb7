use crate::parsing::values::is_amount_like;
use std::fmt;

/// Why a row was kept out of classification entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Empty,
    TooShort,
    /// The description is itself a number (misaligned columns).
    NumericDescription,
    /// The label cell was blank and the fallback slot held a percentage.
    RatioInDescriptionSlot,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Empty => write!(f, "empty description"),
            SkipReason::TooShort => write!(f, "description shorter than 2 characters"),
            SkipReason::NumericDescription => write!(f, "description is a number"),
            SkipReason::RatioInDescriptionSlot => write!(f, "ratio value in description slot"),
        }
    }
}

/// Decide whether a row description must be skipped before classification.
///
/// `from_fallback` is true when column 0 was blank and the description was
/// taken from column 1.
pub fn skip_reason(description: &str, from_fallback: bool) -> Option<SkipReason> {
    let description = description.trim();
    if description.is_empty() {
        return Some(SkipReason::Empty);
    }
    if description.chars().count() < 2 {
        return Some(SkipReason::TooShort);
    }
    if is_amount_like(description) {
        return Some(SkipReason::NumericDescription);
    }
    if from_fallback && description.contains('%') {
        return Some(SkipReason::RatioInDescriptionSlot);
    }
    None
}
