use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::error::ExtractionError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChangeType {
    Increased,
    Decreased,
    Unchanged,
}

/// Normalizes the text of a price element into a plain decimal token.
///
/// Only the first whitespace-separated token is kept. Commas become decimal
/// points; if that leaves more than one point, the first one is taken as a
/// thousands separator and dropped. `"1.234,50 TL"` becomes `"1234.50"`.
pub fn normalize_price_text(text: &str) -> Option<String> {
    let token = text.split_whitespace().next()?;
    let mut token = token.replace(',', ".");
    if token.matches('.').count() > 1 {
        if let Some(first) = token.find('.') {
            token.remove(first);
        }
    }
    Some(token)
}

/// Parses price text as shown on a product page.
pub fn parse_price(text: &str) -> Result<Decimal, ExtractionError> {
    let token = normalize_price_text(text).ok_or_else(|| ExtractionError::Parse {
        message: "price text is empty".to_string(),
    })?;

    Decimal::from_str(&token).map_err(|e| ExtractionError::Parse {
        message: format!("'{}' is not a number: {}", token, e),
    })
}

pub fn compare(old_price: Decimal, new_price: Decimal) -> ChangeType {
    if new_price < old_price {
        ChangeType::Decreased
    } else if new_price > old_price {
        ChangeType::Increased
    } else {
        ChangeType::Unchanged
    }
}

/// Percentage change from `old_price` to `new_price`, `None` when the old price is zero.
pub fn percent_change(old_price: Decimal, new_price: Decimal) -> Option<Decimal> {
    if old_price.is_zero() {
        return None;
    }
    Some(((new_price - old_price) / old_price * Decimal::from(100)).round_dp(2))
}
