use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The body sent to create an item. The server assigns the id and owner.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCreate {
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

impl ItemCreate {
  pub fn new(title: &str, description: &str) -> Self {
    let description = if description.is_empty() { None } else { Some(description.to_string()) };
    ItemCreate { title: title.to_string(), description }
  }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPublic {
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub description: Option<String>,
  pub owner_id: String,
}

impl ItemPublic {
  pub fn new(id: &str, title: &str, description: Option<&str>, owner_id: &str) -> Self {
    ItemPublic {
      id: id.to_string(),
      title: title.to_string(),
      description: description.map(String::from),
      owner_id: owner_id.to_string(),
    }
  }
}

/// A page of items as returned by the list endpoint.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsPublic {
  pub data: Vec<ItemPublic>,
  pub count: usize,
}

/// A non-success response from the API. `body` holds the parsed JSON body when
/// the server sent one.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{status} {reason}")]
pub struct ApiError {
  pub status: u16,
  pub reason: String,
  pub body: Option<Value>,
}

impl ApiError {
  pub fn new(status: u16, reason: &str, body: &str) -> Self {
    let body = serde_json::from_str::<Value>(body).ok();
    ApiError { status, reason: reason.to_string(), body }
  }

  /// Human readable `detail` from the body.
  ///
  /// Plain string details are returned as is. Validation failures come back as a
  /// list of objects with a `msg` field, those messages are joined with `"; "`.
  pub fn detail(&self) -> Option<String> {
    match self.body.as_ref()?.get("detail")? {
      Value::String(detail) => Some(detail.clone()),
      Value::Array(entries) => {
        let messages: Vec<&str> = entries.iter().filter_map(|entry| entry.get("msg")?.as_str()).collect();
        if messages.is_empty() { None } else { Some(messages.join("; ")) }
      },
      _ => None,
    }
  }
}
