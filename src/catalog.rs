//! Product catalog: the local cache of the remote products table.
//!
//! The catalog owns the last successfully listed collection. It is only ever
//! replaced by a full list fetch; mutations never edit it in place. Adding or
//! removing a product is a two-step sequence run in one task: await the
//! mutation, then (only if it succeeded) await a fresh list. The result of the
//! list is applied like a manual refresh, except that lists started before it
//! can no longer overwrite it.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::query::Query;
use crate::store::{NewProduct, Product, ProductStore};

/// Raw text the user typed into the add form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
  pub name: String,
  pub sku: String,
  pub stock: String,
  pub price: String,
}

impl ProductForm {
  /// Validate the form into an insertable candidate.
  ///
  /// Returns `None` when name or sku is blank after trimming. Stock falls back
  /// to 0 when it is not a non-negative integer; a blank price becomes "0".
  pub fn candidate(&self) -> Option<NewProduct> {
    let name = self.name.trim();
    let sku = self.sku.trim();
    if name.is_empty() || sku.is_empty() {
      return None;
    }

    let price = self.price.trim();
    Some(NewProduct {
      name: name.to_string(),
      sku: sku.to_string(),
      stock: parse_stock(&self.stock),
      price: if price.is_empty() {
        "0".to_string()
      } else {
        price.to_string()
      },
    })
  }
}

/// Parse the leading integer of `input` ("12abc" is 12). Negative or
/// unparsable input is 0.
fn parse_stock(input: &str) -> i64 {
  let s = input.trim();
  let (negative, digits) = match s.strip_prefix('-') {
    Some(rest) => (true, rest),
    None => (false, s.strip_prefix('+').unwrap_or(s)),
  };
  let end = digits
    .find(|c: char| !c.is_ascii_digit())
    .unwrap_or(digits.len());

  match digits[..end].parse::<i64>() {
    Ok(n) if !negative => n,
    _ => 0,
  }
}

/// Case-insensitive substring match on name or sku
pub fn matches_filter(product: &Product, filter: &str) -> bool {
  let needle = filter.to_lowercase();
  product.name.to_lowercase().contains(&needle) || product.sku.to_lowercase().contains(&needle)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
  Add,
  Remove,
}

/// What a mutation task reports back
#[derive(Debug)]
enum Outcome {
  /// The mutation failed, nothing was refetched
  Failed(Mutation, String),
  /// The mutation succeeded and the list was fetched again
  Refetched(Mutation, Result<Vec<Product>, String>),
}

/// View-model for the products screen.
pub struct Catalog<S: ProductStore> {
  store: S,
  query: Query<Vec<Product>>,
  tx: mpsc::UnboundedSender<Outcome>,
  rx: mpsc::UnboundedReceiver<Outcome>,
  adding: bool,
  removing: bool,
}

impl<S: ProductStore> Catalog<S> {
  pub fn new(store: S) -> Self {
    let store_for_query = store.clone();
    let query = Query::new(move || {
      let store = store_for_query.clone();
      async move { store.list().await.map_err(|e| e.to_string()) }
    });
    let (tx, rx) = mpsc::unbounded_channel();

    Self {
      store,
      query,
      tx,
      rx,
      adding: false,
      removing: false,
    }
  }

  /// Last successfully listed products (empty before the first success)
  pub fn records(&self) -> &[Product] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  pub fn is_loading(&self) -> bool {
    self.query.is_loading()
  }

  /// Whether at least one list has succeeded
  pub fn is_loaded(&self) -> bool {
    self.query.data().is_some()
  }

  pub fn error(&self) -> Option<&str> {
    self.query.error()
  }

  pub fn is_adding(&self) -> bool {
    self.adding
  }

  pub fn is_removing(&self) -> bool {
    self.removing
  }

  pub fn fetched_at(&self) -> Option<chrono::DateTime<chrono::Local>> {
    self.query.fetched_at()
  }

  /// Initial load; a no-op while a list is already in flight
  pub fn load(&mut self) {
    self.query.fetch();
  }

  /// Fetch the full list again
  pub fn refresh(&mut self) {
    info!("refreshing products");
    self.query.refetch();
  }

  /// Validate and insert a product, then refetch.
  ///
  /// Returns `false` without contacting the store when the form is invalid or
  /// another add is still in flight.
  pub fn add(&mut self, form: &ProductForm) -> bool {
    if self.adding {
      return false;
    }
    let Some(candidate) = form.candidate() else {
      return false;
    };

    self.adding = true;
    let store = self.store.clone();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let outcome = match store.insert(&candidate).await {
        Ok(product) => {
          info!(id = %product.id, sku = %product.sku, "product added");
          let listed = store.list().await.map_err(|e| e.to_string());
          Outcome::Refetched(Mutation::Add, listed)
        }
        Err(e) => Outcome::Failed(Mutation::Add, e.to_string()),
      };
      let _ = tx.send(outcome);
    });
    true
  }

  /// Delete a product by id, then refetch.
  ///
  /// Returns `false` when another remove is still in flight.
  pub fn remove(&mut self, id: &str) -> bool {
    if self.removing {
      return false;
    }

    self.removing = true;
    let store = self.store.clone();
    let tx = self.tx.clone();
    let id = id.to_string();
    tokio::spawn(async move {
      let outcome = match store.delete(&id).await {
        Ok(()) => {
          info!(%id, "product removed");
          let listed = store.list().await.map_err(|e| e.to_string());
          Outcome::Refetched(Mutation::Remove, listed)
        }
        Err(e) => Outcome::Failed(Mutation::Remove, e.to_string()),
      };
      let _ = tx.send(outcome);
    });
    true
  }

  /// Products whose name or sku contains `filter`, in list order.
  /// Does not touch the cached records.
  pub fn visible(&self, filter: &str) -> Vec<&Product> {
    if filter.is_empty() {
      return self.records().iter().collect();
    }
    self
      .records()
      .iter()
      .filter(|p| matches_filter(p, filter))
      .collect()
  }

  /// Apply finished fetches and mutations. Returns `true` if anything changed.
  pub fn poll(&mut self) -> bool {
    let mut changed = self.query.poll();
    while let Ok(outcome) = self.rx.try_recv() {
      self.apply(outcome);
      changed = true;
    }
    changed
  }

  /// Wait for every in-flight mutation and fetch to finish.
  pub async fn settle(&mut self) {
    while self.adding || self.removing {
      match self.rx.recv().await {
        Some(outcome) => self.apply(outcome),
        None => break,
      }
    }
    self.query.settle().await;
  }

  fn apply(&mut self, outcome: Outcome) {
    let mutation = match outcome {
      Outcome::Failed(mutation, message) => {
        warn!(?mutation, %message, "mutation failed");
        self.query.set_error(message);
        mutation
      }
      Outcome::Refetched(mutation, listed) => {
        if let Err(message) = &listed {
          warn!(?mutation, %message, "refetch after mutation failed");
        }
        // Supersedes any list that started before the mutation landed
        self.query.resolve(listed);
        mutation
      }
    };

    match mutation {
      Mutation::Add => self.adding = false,
      Mutation::Remove => self.removing = false,
    }
  }
}
