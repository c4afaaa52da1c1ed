//! Remote store access for the products table.

pub mod api_types;
pub mod client;
pub mod error;
pub mod types;

use std::future::Future;

pub use client::StoreClient;
pub use error::StoreError;
pub use types::{NewProduct, Product};

/// CRUD operations against the remote products table.
///
/// Each call is one request; nothing is retried. Implementations are cheap to
/// clone so a copy can be moved into a spawned task.
pub trait ProductStore: Clone + Send + Sync + 'static {
  /// Fetch every row of the table
  fn list(&self) -> impl Future<Output = Result<Vec<Product>, StoreError>> + Send;

  /// Insert a candidate and return the stored row with its assigned id
  fn insert(
    &self,
    candidate: &NewProduct,
  ) -> impl Future<Output = Result<Product, StoreError>> + Send;

  /// Delete the row with this id. Deleting an absent row succeeds.
  fn delete(&self, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}
