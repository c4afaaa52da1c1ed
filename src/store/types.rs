use serde::Serialize;

/// A product row as held in the local cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
  pub id: String,
  pub name: String,
  pub sku: String,
  pub stock: i64,
  pub price: String, // Decimal kept as text, never a float
}

/// A validated candidate ready to be inserted.
/// The remote store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProduct {
  pub name: String,
  pub sku: String,
  pub stock: i64,
  pub price: String,
}

#[cfg(test)]
impl NewProduct {
  /// Build the row the store would return for this candidate
  pub fn with_id(self, id: impl Into<String>) -> Product {
    Product {
      id: id.into(),
      name: self.name,
      sku: self.sku,
      stock: self.stock,
      price: self.price,
    }
  }
}
