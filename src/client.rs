use crate::config::*;
use crate::types::*;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

// ── Error taxonomy ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{operation}: request failed: {message}")]
  Transport {
    operation: &'static str,
    message: String,
  },
  #[error("{operation}: server returned {status}: {body}")]
  Status {
    operation: &'static str,
    status: u16,
    body: String,
  },
  #[error("{operation}: invalid response: {message}")]
  Malformed {
    operation: &'static str,
    message: String,
  },
  #[error("{operation}: {message}")]
  Server {
    operation: &'static str,
    message: String,
  },
}

impl ApiError {
  /// The server-sent message for a reported error, if this is one.
  pub fn server_message(&self) -> Option<&str> {
    match self {
      ApiError::Server { message, .. } => Some(message),
      _ => None,
    }
  }
}

/// Extracts the message from an `{error: ...}` payload body.
pub fn server_error_message(value: &Value) -> Option<String> {
  match value.get("error")? {
    Value::Null => None,
    Value::String(text) => Some(text.clone()),
    other => Some(other.to_string()),
  }
}

pub fn value_text(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(text) => text.clone(),
    Value::Number(number) => number.to_string(),
    Value::Bool(flag) => flag.to_string(),
    other => other.to_string(),
  }
}

// ── Client ─────────────────────────────────────────────────────────────

pub struct ServerClient {
  base_url: String,
  http: reqwest::blocking::Client,
  log_requests: bool,
}

impl ServerClient {
  pub fn from_config(config: &AppConfig) -> Self {
    let trimmed = config.server_url.trim();
    let base_url = if trimmed.is_empty() {
      env_default("SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    } else {
      trimmed.to_string()
    };
    ServerClient::new(base_url, request_log_enabled(config))
  }

  pub fn new(base_url: impl Into<String>, log_requests: bool) -> Self {
    let mut base_url = base_url.into();
    while base_url.ends_with('/') {
      base_url.pop();
    }
    ServerClient {
      base_url,
      http: reqwest::blocking::Client::new(),
      log_requests,
    }
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn fetch_bracket(&self) -> Result<BracketDocument, ApiError> {
    let value = self.get_json("load bracket", "/bracket_data")?;
    decode("load bracket", value)
  }

  pub fn fetch_status(&self) -> Result<StatusPayload, ApiError> {
    let value = self.get_json("load tournament status", "/tournament_status")?;
    decode("load tournament status", value)
  }

  pub fn start_tournament(&self) -> Result<(), ApiError> {
    self
      .post_json("start tournament", "/start_tournament", None)
      .map(|_| ())
  }

  pub fn reset_tournament(&self) -> Result<(), ApiError> {
    self
      .post_json("reset tournament", "/reset_tournament", None)
      .map(|_| ())
  }

  pub fn start_match(&self, player1: &str, player2: &str, match_id: u64) -> Result<(), ApiError> {
    let body = json!({ "player1": player1, "player2": player2, "match_id": match_id });
    self
      .post_json("start match", "/start_tournament_match", Some(&body))
      .map(|_| ())
  }

  pub fn report_result(&self, winner: &str, loser: &str) -> Result<(), ApiError> {
    let body = json!({ "winner": winner, "loser": loser });
    self
      .post_json("record result", "/match_result", Some(&body))
      .map(|_| ())
  }

  pub fn fetch_players(&self) -> Result<Vec<PlayerEntry>, ApiError> {
    let value = self.get_json("load players", "/players")?;
    decode("load players", value)
  }

  pub fn fetch_scores_history(&self) -> Result<ScoresHistoryPayload, ApiError> {
    let value = self.get_json("load scores", "/scores_history")?;
    decode("load scores", value)
  }

  pub fn fetch_player_profile(&self, username: &str) -> Result<PlayerProfile, ApiError> {
    let value = self.get_json("load player profile", &format!("/player_profile/{username}"))?;
    decode("load player profile", value)
  }

  fn get_json(&self, operation: &'static str, path: &str) -> Result<Value, ApiError> {
    let url = format!("{}{}", self.base_url, path);
    if self.log_requests {
      append_api_log("request", &format!("GET {url}"));
    }
    let response = match self.http.get(&url).send() {
      Ok(response) => response,
      Err(e) => {
        append_api_log("error", &format!("{operation}: send failed: {e}"));
        return Err(ApiError::Transport {
          operation,
          message: e.to_string(),
        });
      }
    };
    self.read_json(operation, &url, response)
  }

  fn post_json(
    &self,
    operation: &'static str,
    path: &str,
    body: Option<&Value>,
  ) -> Result<Value, ApiError> {
    let url = format!("{}{}", self.base_url, path);
    if self.log_requests {
      let payload = body.map(|value| value.to_string()).unwrap_or_default();
      append_api_log("request", &format!("POST {url}\n{payload}"));
    }
    let mut builder = self.http.post(&url);
    if let Some(body) = body {
      builder = builder.json(body);
    }
    let response = match builder.send() {
      Ok(response) => response,
      Err(e) => {
        append_api_log("error", &format!("{operation}: send failed: {e}"));
        return Err(ApiError::Transport {
          operation,
          message: e.to_string(),
        });
      }
    };
    self.read_json(operation, &url, response)
  }

  fn read_json(
    &self,
    operation: &'static str,
    url: &str,
    response: reqwest::blocking::Response,
  ) -> Result<Value, ApiError> {
    let status = response.status();
    let body = match response.text() {
      Ok(body) => body,
      Err(e) => {
        append_api_log("error", &format!("{operation}: read failed: {e}"));
        return Err(ApiError::Transport {
          operation,
          message: format!("read failed: {e}"),
        });
      }
    };
    if self.log_requests {
      append_api_log("response", &format!("{url}\nstatus: {status}\nbody:\n{body}"));
    }
    if !status.is_success() {
      append_api_log("error", &format!("{operation}: status {status}\nbody:\n{body}"));
      return Err(ApiError::Status {
        operation,
        status: status.as_u16(),
        body,
      });
    }
    let value: Value = match serde_json::from_str(&body) {
      Ok(value) => value,
      Err(e) => {
        append_api_log("error", &format!("{operation}: parse failed: {e}\nbody:\n{body}"));
        return Err(ApiError::Malformed {
          operation,
          message: e.to_string(),
        });
      }
    };
    if let Some(message) = server_error_message(&value) {
      append_api_log("error", &format!("{operation}: server error: {message}"));
      return Err(ApiError::Server { operation, message });
    }
    Ok(value)
  }
}

fn decode<T: DeserializeOwned>(operation: &'static str, value: Value) -> Result<T, ApiError> {
  serde_json::from_value(value).map_err(|e| ApiError::Malformed {
    operation,
    message: e.to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_server_error_message_variants() {
    assert_eq!(
      server_error_message(&json!({ "error": "Tournament already started" })),
      Some("Tournament already started".to_string())
    );
    assert_eq!(server_error_message(&json!({ "error": null })), None);
    assert_eq!(server_error_message(&json!({ "status": "ok" })), None);
    assert_eq!(server_error_message(&json!([1, 2, 3])), None);
  }

  #[test]
  fn test_value_text_variants() {
    assert_eq!(value_text(&json!("2m30s")), "2m30s");
    assert_eq!(value_text(&json!(42)), "42");
    assert_eq!(value_text(&json!(null)), "");
  }

  #[test]
  fn test_base_url_trailing_slash_trimmed() {
    let client = ServerClient::new("http://localhost:5000///", false);
    assert_eq!(client.base_url(), "http://localhost:5000");
  }

  #[test]
  fn test_server_error_has_server_message() {
    let err = ApiError::Server {
      operation: "start match",
      message: "Not your turn.".to_string(),
    };
    assert_eq!(err.server_message(), Some("Not your turn."));
    let err = ApiError::Transport {
      operation: "start match",
      message: "connection refused".to_string(),
    };
    assert_eq!(err.server_message(), None);
  }
}
