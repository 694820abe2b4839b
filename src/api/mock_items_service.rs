use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{
  items_service::ItemsService,
  types::{ApiError, ItemCreate, ItemPublic, ItemsPublic},
};
use crate::error::Error;

/// Records every create call and answers with a canned outcome.
#[derive(Clone, Default)]
pub struct MockItemsService {
  pub created: Arc<Mutex<Vec<ItemCreate>>>,
  failure: Option<ApiError>,
  items: Vec<ItemPublic>,
}

impl MockItemsService {
  pub fn failing_with(status: u16, reason: &str, body: &str) -> Self {
    MockItemsService { failure: Some(ApiError::new(status, reason, body)), ..Default::default() }
  }

  pub fn with_items(items: Vec<ItemPublic>) -> Self {
    MockItemsService { items, ..Default::default() }
  }

  pub fn created(&self) -> Vec<ItemCreate> {
    self.created.lock().unwrap().clone()
  }
}

#[async_trait]
impl ItemsService for MockItemsService {
  async fn create_item(&self, draft: &ItemCreate) -> Result<ItemPublic, Error> {
    self.created.lock().unwrap().push(draft.clone());
    match &self.failure {
      Some(failure) => Err(Error::Api(failure.clone())),
      None => Ok(ItemPublic {
        id: format!("item-{}", self.created.lock().unwrap().len()),
        title: draft.title.clone(),
        description: draft.description.clone(),
        owner_id: "owner".to_string(),
      }),
    }
  }

  async fn read_items(&self, skip: usize, limit: usize) -> Result<ItemsPublic, Error> {
    if let Some(failure) = &self.failure {
      return Err(Error::Api(failure.clone()));
    }
    let data: Vec<ItemPublic> = self.items.iter().skip(skip).take(limit).cloned().collect();
    Ok(ItemsPublic { data, count: self.items.len() })
  }
}
