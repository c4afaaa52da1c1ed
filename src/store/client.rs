//! HTTP client for the products table behind a PostgREST endpoint.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::api_types::{ApiErrorBody, ApiProduct};
use super::error::StoreError;
use super::types::{NewProduct, Product};
use super::ProductStore;
use crate::config::Config;

/// REST path prefix of the hosted database service
const REST_PREFIX: &str = "rest/v1";

/// Remote store client for a single table
#[derive(Clone)]
pub struct StoreClient {
  client: Client,
  table_url: Url,
}

impl StoreClient {
  pub fn new(config: &Config) -> color_eyre::Result<Self> {
    let api_key = Config::get_api_key()?;
    let url = config.store_url()?;

    let client = Self::with_base_url(
      url,
      &api_key,
      &config.store.table,
      config.store.timeout_secs,
    )?;
    Ok(client)
  }

  /// Create a client for an explicit base URL (also used against mock servers)
  pub fn with_base_url(
    base_url: &str,
    api_key: &str,
    table: &str,
    timeout_secs: u64,
  ) -> Result<Self, StoreError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert("apikey", header_value(api_key)?);
    headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", api_key))?);

    let client = Client::builder()
      .default_headers(headers)
      .timeout(Duration::from_secs(timeout_secs))
      .connect_timeout(Duration::from_secs(10))
      .user_agent(concat!("stockroom/", env!("CARGO_PKG_VERSION")))
      .build()?;

    let table_url = table_url(base_url, table)?;

    Ok(Self { client, table_url })
  }

  /// Host part of the store URL, for display
  pub fn host(&self) -> &str {
    self.table_url.host_str().unwrap_or("")
  }

  /// Turn a non-success response into a `StoreError::Remote` carrying the
  /// service's own message where there is one.
  async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
      .ok()
      .and_then(ApiErrorBody::into_message)
      .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
      .unwrap_or_else(|| {
        status
          .canonical_reason()
          .map(String::from)
          .unwrap_or_else(|| status.to_string())
      });

    warn!(%status, %message, "store request failed");
    Err(StoreError::Remote { status, message })
  }

  async fn decode<T: DeserializeOwned>(response: Response, context: &str) -> Result<T, StoreError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| StoreError::Decode {
      context: context.to_string(),
      source,
    })
  }
}

impl ProductStore for StoreClient {
  async fn list(&self) -> Result<Vec<Product>, StoreError> {
    debug!(url = %self.table_url, "listing products");
    let response = self
      .client
      .get(self.table_url.clone())
      .query(&[("select", "*")])
      .send()
      .await?;
    let response = Self::check(response).await?;

    let rows: Vec<ApiProduct> = Self::decode(response, "list").await?;
    Ok(rows.into_iter().map(ApiProduct::into_product).collect())
  }

  async fn insert(&self, candidate: &NewProduct) -> Result<Product, StoreError> {
    debug!(sku = %candidate.sku, "inserting product");
    let response = self
      .client
      .post(self.table_url.clone())
      .header("Prefer", "return=representation")
      .json(candidate)
      .send()
      .await?;
    let response = Self::check(response).await?;

    // PostgREST returns the inserted rows as an array
    let rows: Vec<ApiProduct> = Self::decode(response, "insert").await?;
    rows
      .into_iter()
      .next()
      .map(ApiProduct::into_product)
      .ok_or_else(|| StoreError::Empty("insert returned no row".to_string()))
  }

  async fn delete(&self, id: &str) -> Result<(), StoreError> {
    debug!(%id, "deleting product");
    let response = self
      .client
      .delete(self.table_url.clone())
      .query(&[("id", format!("eq.{}", id))])
      .send()
      .await?;

    // Deleting a row that is already gone is not an error
    if response.status() == StatusCode::NOT_FOUND {
      debug!(%id, "product already absent");
      return Ok(());
    }
    Self::check(response).await?;
    Ok(())
  }
}

/// `{base}/rest/v1/{table}`, with the table pushed as one encoded segment
fn table_url(base_url: &str, table: &str) -> Result<Url, StoreError> {
  let mut url = Url::parse(base_url)
    .map_err(|e| StoreError::Config(format!("invalid store URL '{}': {}", base_url, e)))?;
  url
    .path_segments_mut()
    .map_err(|_| StoreError::Config(format!("store URL '{}' cannot be a base", base_url)))?
    .pop_if_empty()
    .extend(REST_PREFIX.split('/'))
    .push(table);
  Ok(url)
}

fn header_value(value: &str) -> Result<HeaderValue, StoreError> {
  HeaderValue::from_str(value)
    .map_err(|e| StoreError::Config(format!("invalid API key: {}", e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use wiremock::matchers::{body_json, header, method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn test_client(base_url: &str) -> StoreClient {
    StoreClient::with_base_url(base_url, "test-key", "products", 5).unwrap()
  }

  #[tokio::test]
  async fn test_list_sends_key_and_parses_rows() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/rest/v1/products"))
      .and(query_param("select", "*"))
      .and(header("apikey", "test-key"))
      .and(header("authorization", "Bearer test-key"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([
        {"id": 1, "name": "Widget", "sku": "W-1", "stock": 5, "price": "2.50"},
        {"id": 2, "name": "Gadget", "sku": "G-7", "stock": null, "price": null}
      ])))
      .mount(&server)
      .await;

    let products = test_client(&server.uri()).list().await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, "1");
    assert_eq!(products[0].price, "2.50");
    assert_eq!(products[1].stock, 0);
    assert_eq!(products[1].price, "0");
  }

  #[tokio::test]
  async fn test_insert_returns_row_with_assigned_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
      .and(path("/rest/v1/products"))
      .and(header("prefer", "return=representation"))
      .and(body_json(json!({"name": "Widget", "sku": "W-1", "stock": 5, "price": "2.50"})))
      .respond_with(ResponseTemplate::new(201).set_body_json(json!([
        {"id": 42, "name": "Widget", "sku": "W-1", "stock": 5, "price": "2.50"}
      ])))
      .mount(&server)
      .await;

    let candidate = NewProduct {
      name: "Widget".to_string(),
      sku: "W-1".to_string(),
      stock: 5,
      price: "2.50".to_string(),
    };
    let product = test_client(&server.uri()).insert(&candidate).await.unwrap();

    assert_eq!(product, candidate.with_id("42"));
  }

  #[tokio::test]
  async fn test_insert_conflict_surfaces_store_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(409).set_body_json(json!({
        "code": "23505",
        "details": "Key (sku)=(W-1) already exists.",
        "hint": null,
        "message": "duplicate key value violates unique constraint \"products_sku_key\""
      })))
      .mount(&server)
      .await;

    let candidate = NewProduct {
      name: "Widget".to_string(),
      sku: "W-1".to_string(),
      stock: 0,
      price: "0".to_string(),
    };
    let err = test_client(&server.uri())
      .insert(&candidate)
      .await
      .unwrap_err();

    assert!(matches!(err, StoreError::Remote { status, .. } if status == StatusCode::CONFLICT));
    assert_eq!(
      err.to_string(),
      "duplicate key value violates unique constraint \"products_sku_key\""
    );
  }

  #[tokio::test]
  async fn test_insert_with_empty_representation_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
      .mount(&server)
      .await;

    let candidate = NewProduct {
      name: "Widget".to_string(),
      sku: "W-1".to_string(),
      stock: 0,
      price: "0".to_string(),
    };
    let err = test_client(&server.uri())
      .insert(&candidate)
      .await
      .unwrap_err();
    assert!(matches!(err, StoreError::Empty(_)));
  }

  #[tokio::test]
  async fn test_delete_filters_on_id() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
      .and(path("/rest/v1/products"))
      .and(query_param("id", "eq.42"))
      .respond_with(ResponseTemplate::new(204))
      .expect(1)
      .mount(&server)
      .await;

    test_client(&server.uri()).delete("42").await.unwrap();
  }

  #[tokio::test]
  async fn test_delete_of_missing_row_is_ok() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
      .respond_with(ResponseTemplate::new(404))
      .mount(&server)
      .await;

    assert!(test_client(&server.uri()).delete("404").await.is_ok());
  }

  #[tokio::test]
  async fn test_plain_text_error_body_is_used_as_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
      .mount(&server)
      .await;

    let err = test_client(&server.uri()).list().await.unwrap_err();
    assert_eq!(err.to_string(), "upstream unavailable");
  }

  #[tokio::test]
  async fn test_empty_error_body_uses_status_reason() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(401))
      .mount(&server)
      .await;

    let err = test_client(&server.uri()).list().await.unwrap_err();
    assert_eq!(err.to_string(), "Unauthorized");
  }

  #[test]
  fn test_trailing_slash_is_stripped() {
    let client = test_client("https://demo.supabase.co/");
    assert_eq!(
      client.table_url.as_str(),
      "https://demo.supabase.co/rest/v1/products"
    );
    assert_eq!(client.host(), "demo.supabase.co");
  }

  #[test]
  fn test_base_path_is_kept() {
    let client = test_client("https://proxy.example.com/db/");
    assert_eq!(
      client.table_url.as_str(),
      "https://proxy.example.com/db/rest/v1/products"
    );
  }

  #[test]
  fn test_table_name_is_one_encoded_segment() {
    let client = StoreClient::with_base_url("https://demo.supabase.co", "k", "a/b?c#d", 5).unwrap();
    assert_eq!(
      client.table_url.as_str(),
      "https://demo.supabase.co/rest/v1/a%2Fb%3Fc%23d"
    );
    assert!(client.table_url.query().is_none());
    assert!(client.table_url.fragment().is_none());
  }

  #[test]
  fn test_bad_settings_are_config_errors() {
    let err = StoreClient::with_base_url("not a url", "k", "products", 5).err().unwrap();
    assert!(matches!(err, StoreError::Config(_)));
    assert!(err.to_string().starts_with("invalid store URL"));

    let err = StoreClient::with_base_url("https://demo.supabase.co", "bad\nkey", "products", 5)
      .err()
      .unwrap();
    assert!(matches!(err, StoreError::Config(_)));
    assert!(err.to_string().starts_with("invalid API key"));
  }
}
