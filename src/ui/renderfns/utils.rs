use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Format a textual price as dollars with two decimals ("2.5" -> "$2.50").
/// Text that is not a number is shown as is.
pub fn format_price(price: &str) -> String {
  let trimmed = price.trim();
  let parsed = Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed));

  match parsed {
    Ok(value) => {
      let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
      rounded.rescale(2);
      format!("${}", rounded)
    }
    Err(_) => price.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("ñandú ñandú", 8), "ñandú...");
  }

  #[test]
  fn test_format_price() {
    assert_eq!(format_price("2.50"), "$2.50");
    assert_eq!(format_price("2.5"), "$2.50");
    assert_eq!(format_price("0"), "$0.00");
    assert_eq!(format_price("1.005"), "$1.01");
    assert_eq!(format_price("1e2"), "$100.00");
  }

  #[test]
  fn test_format_price_passes_through_garbage() {
    assert_eq!(format_price("call us"), "call us");
  }
}
