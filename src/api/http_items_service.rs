use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{error, info};

use super::{
  items_service::ItemsService,
  types::{ApiError, ItemCreate, ItemPublic, ItemsPublic},
};
use crate::{config::ApiConfig, error::Error};

pub struct HttpItemsService {
  client: Client,
  base_url: String,
  token: Option<String>,
}

impl HttpItemsService {
  pub fn new(config: &ApiConfig) -> Result<HttpItemsService, Error> {
    let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
    Ok(HttpItemsService {
      client,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      token: config.token.clone(),
    })
  }

  fn items_url(&self) -> String {
    format!("{}/api/v1/items/", self.base_url)
  }

  fn request(&self, method: Method, url: &str) -> RequestBuilder {
    let builder = self.client.request(method, url);
    match &self.token {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    }
  }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
  let status = response.status();
  let body = response.text().await?;
  if status.is_success() {
    return Ok(serde_json::from_str(&body)?);
  }
  let api_error = ApiError::new(status.as_u16(), status.canonical_reason().unwrap_or("Unknown Error"), &body);
  error!("Request failed with {}, body: {}", api_error, body);
  Err(api_error.into())
}

#[async_trait]
impl ItemsService for HttpItemsService {
  async fn create_item(&self, draft: &ItemCreate) -> Result<ItemPublic, Error> {
    let url = self.items_url();
    info!("POST {} title={:?}", url, draft.title);
    let response = self.request(Method::POST, &url).json(draft).send().await?;
    parse_response(response).await
  }

  async fn read_items(&self, skip: usize, limit: usize) -> Result<ItemsPublic, Error> {
    let url = self.items_url();
    info!("GET {} skip={} limit={}", url, skip, limit);
    let response = self.request(Method::GET, &url).query(&[("skip", skip), ("limit", limit)]).send().await?;
    parse_response(response).await
  }
}
