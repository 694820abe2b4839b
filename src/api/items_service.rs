use super::types::{ItemCreate, ItemPublic, ItemsPublic};
use crate::error::Error;

#[async_trait::async_trait]
pub trait ItemsService: Send + Sync {
  async fn create_item(&self, draft: &ItemCreate) -> Result<ItemPublic, Error>;
  async fn read_items(&self, skip: usize, limit: usize) -> Result<ItemsPublic, Error>;
}
