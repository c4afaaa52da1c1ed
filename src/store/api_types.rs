//! Serde-deserializable types matching the REST responses of the products table.
//!
//! Rows come back from PostgREST with whatever column types the table was
//! created with, so the wire types accept both numbers and strings and the
//! conversion into [`Product`] normalizes them.

use serde::Deserialize;
use serde_json::Value;

use super::types::Product;

// ============================================================================
// Product rows
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiProduct {
  pub id: Value,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub sku: Option<String>,
  #[serde(default)]
  pub stock: Option<Value>,
  #[serde(default)]
  pub price: Option<Value>,
}

impl ApiProduct {
  pub fn into_product(self) -> Product {
    Product {
      id: scalar_text(&self.id).unwrap_or_default(),
      name: self.name.unwrap_or_default(),
      sku: self.sku.unwrap_or_default(),
      stock: self.stock.as_ref().map(stock_value).unwrap_or(0),
      price: self
        .price
        .as_ref()
        .and_then(scalar_text)
        .unwrap_or_else(|| "0".to_string()),
    }
  }
}

/// Render a JSON scalar as text. Null, arrays and objects have no text form.
fn scalar_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

/// Stock is a non-negative integer; anything else reads as 0
fn stock_value(value: &Value) -> i64 {
  let parsed = match value {
    Value::Number(n) => n.as_i64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  };
  parsed.filter(|n| *n >= 0).unwrap_or(0)
}

// ============================================================================
// Error bodies
// ============================================================================

/// Error body returned by PostgREST and the gateway in front of it.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
  pub message: Option<String>,
  pub details: Option<String>,
  pub hint: Option<String>,
  pub error: Option<String>,
  pub error_description: Option<String>,
}

impl ApiErrorBody {
  /// The most specific human-readable message in the body
  pub fn into_message(self) -> Option<String> {
    [
      self.message,
      self.details,
      self.hint,
      self.error_description,
      self.error,
    ]
    .into_iter()
    .flatten()
    .find(|m| !m.trim().is_empty())
  }
}
