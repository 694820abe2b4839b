use thiserror::Error;

use crate::api::types::ApiError;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Api(#[from] ApiError),
  #[error(transparent)]
  Http(#[from] reqwest::Error),
  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

impl Error {
  /// The message shown to the user for a failed request. Falls back to the
  /// error's display form when the server sent no usable `detail`.
  pub fn detail_message(&self) -> String {
    match self {
      Error::Api(api_error) => api_error.detail().unwrap_or_else(|| self.to_string()),
      _ => self.to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn test_detail_message_uses_body_detail() {
    let err = Error::from(ApiError::new(409, "Conflict", r#"{"detail":"Title already exists"}"#));

    assert_eq!(err.detail_message(), "Title already exists");
  }

  #[test]
  fn test_detail_message_falls_back_to_display() {
    let err = Error::from(ApiError::new(502, "Bad Gateway", ""));

    assert_eq!(err.detail_message(), "502 Bad Gateway");
  }

  #[test]
  fn test_detail_message_for_json_error() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let expected = json_err.to_string();
    let err = Error::from(json_err);

    assert_eq!(err.detail_message(), expected);
  }
}
