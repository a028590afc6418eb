use crate::types::*;
use chrono::Local;
use std::{
    env,
    fs,
    io::Write,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

pub fn repo_root() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn config_path() -> PathBuf {
  if let Ok(raw) = env::var("CONFIG_PATH") {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return PathBuf::from(trimmed);
    }
  }
  repo_root().join("config.json")
}

pub fn env_default(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

pub fn env_flag_true_default(key: &str, default: bool) -> bool {
  match env::var(key) {
    Ok(value) => {
      let value = value.trim().to_ascii_lowercase();
      matches!(value.as_str(), "1" | "true" | "yes" | "on")
    }
    Err(_) => default,
  }
}

pub fn apply_env_defaults(mut config: AppConfig) -> AppConfig {
  if config.server_url.trim().is_empty() {
    if let Some(value) = env_default("SERVER_URL") {
      config.server_url = value;
    }
  }
  config
}

pub fn load_config_inner() -> Result<AppConfig, String> {
  let path = config_path();
  if !path.is_file() {
    return Ok(apply_env_defaults(AppConfig::default()));
  }
  let data = fs::read_to_string(&path).map_err(|e| format!("read config {}: {e}", path.display()))?;
  let config =
    serde_json::from_str::<AppConfig>(&data).map_err(|e| format!("parse config {}: {e}", path.display()))?;
  Ok(apply_env_defaults(config))
}

pub fn save_config_inner(config: AppConfig) -> Result<AppConfig, String> {
  let path = config_path();
  let mut payload = serde_json::to_string_pretty(&config).map_err(|e| e.to_string())?;
  payload.push('\n');
  fs::write(&path, payload).map_err(|e| format!("write config {}: {e}", path.display()))?;
  Ok(config)
}

/// First run only: writes a default `config.json` so the operator has a file
/// to edit. An existing file is never touched. The template leaves `serverUrl`
/// empty, which keeps the SERVER_URL env override in effect.
pub fn ensure_config_file() -> Result<(), String> {
  if config_path().is_file() {
    return Ok(());
  }
  save_config_inner(AppConfig::default()).map(|_| ())
}

/// Poll interval for `/tournament_status`, clamped so a misconfigured value
/// can never spin the worker. STATUS_POLL_MS overrides the config file.
pub fn status_poll_interval_ms(config: &AppConfig) -> u64 {
  let configured = match env_default("STATUS_POLL_MS").and_then(|raw| raw.parse::<u64>().ok()) {
    Some(value) if value > 0 => value,
    _ => config.status_poll_ms,
  };
  configured.max(TICK_INTERVAL_MS)
}

pub fn request_log_enabled(config: &AppConfig) -> bool {
  env_flag_true_default("REQUEST_LOG", config.request_log)
}

pub fn load_env_file() {
  let env_path = repo_root().join(".env");
  if !env_path.is_file() {
    return;
  }
  let contents = match fs::read_to_string(&env_path) {
    Ok(data) => data,
    Err(_) => return,
  };
  for line in contents.lines() {
    if let Some((key, value)) = parse_env_line(line) {
      if env::var_os(&key).is_none() {
        env::set_var(key, value);
      }
    }
  }
}

pub fn parse_env_line(line: &str) -> Option<(String, String)> {
  let trimmed = line.trim();
  if trimmed.is_empty() || trimmed.starts_with('#') {
    return None;
  }
  let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
  let (key, raw_value) = trimmed.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  let mut value = raw_value.trim();
  if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if let Some(idx) = value.find('#') {
    value = value[..idx].trim_end();
  }
  Some((key.to_string(), value.to_string()))
}

pub fn log_env_warnings() {
  let config = load_config_inner().unwrap_or_else(|_| AppConfig::default());
  let mut warnings = Vec::new();

  if config.server_url.trim().is_empty() && env_default("SERVER_URL").is_none() {
    warnings.push(format!(
      "SERVER_URL not set and no serverUrl in config, falling back to {DEFAULT_SERVER_URL}"
    ));
  }

  for msg in warnings {
    tracing::warn!("{}", msg);
  }
}

pub fn now_ms() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_millis() as u64
}

pub fn api_log_path() -> PathBuf {
  repo_root().join("logs").join("server_api.log")
}

pub fn append_api_log(label: &str, payload: &str) {
  let dir = repo_root().join("logs");
  if fs::create_dir_all(&dir).is_err() {
    return;
  }
  let path = api_log_path();
  let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
  let entry = format!("[{timestamp}] {label}\n{payload}\n\n");
  if let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(&path) {
    let _ = file.write_all(entry.as_bytes());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_env_line_basic() {
    assert_eq!(
      parse_env_line("SERVER_URL=http://localhost:5000"),
      Some(("SERVER_URL".to_string(), "http://localhost:5000".to_string()))
    );
  }

  #[test]
  fn test_parse_env_line_quotes_and_comments() {
    assert_eq!(
      parse_env_line("export NAME=\"quoted value\""),
      Some(("NAME".to_string(), "quoted value".to_string()))
    );
    assert_eq!(
      parse_env_line("POLL=2000 # trailing comment"),
      Some(("POLL".to_string(), "2000".to_string()))
    );
    assert_eq!(parse_env_line("# full comment"), None);
    assert_eq!(parse_env_line("   "), None);
    assert_eq!(parse_env_line("=nokey"), None);
  }

  #[test]
  fn test_status_poll_interval_clamps_low_values() {
    let config = AppConfig {
      status_poll_ms: 1,
      ..AppConfig::default()
    };
    assert_eq!(status_poll_interval_ms(&config), TICK_INTERVAL_MS);
  }

  #[test]
  fn test_config_persists_as_camel_case() {
    let config = AppConfig {
      server_url: "http://localhost:5000".to_string(),
      status_poll_ms: 3000,
      request_log: false,
    };
    let payload = serde_json::to_string(&config).unwrap();
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(value["serverUrl"], "http://localhost:5000");
    assert_eq!(value["statusPollMs"], 3000);
    assert_eq!(value["requestLog"], false);

    let restored: AppConfig = serde_json::from_str(&payload).unwrap();
    assert_eq!(restored.status_poll_ms, 3000);
    assert!(!restored.request_log);
  }

  #[test]
  fn test_first_run_materializes_config_then_round_trips() {
    let path = env::temp_dir().join(format!("bracket_console_config_{}.json", std::process::id()));
    let _ = fs::remove_file(&path);
    env::set_var("CONFIG_PATH", &path);

    ensure_config_file().unwrap();
    let materialized = fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&materialized).unwrap();
    assert_eq!(value["serverUrl"], "");
    assert_eq!(value["statusPollMs"], 2000);
    assert_eq!(value["requestLog"], true);
    assert!(materialized.ends_with('\n'));

    let saved = save_config_inner(AppConfig {
      server_url: "http://127.0.0.1:9999".to_string(),
      status_poll_ms: 4500,
      request_log: false,
    })
    .unwrap();
    let loaded = load_config_inner().unwrap();
    assert_eq!(loaded.server_url, saved.server_url);
    assert_eq!(loaded.status_poll_ms, 4500);
    assert!(!loaded.request_log);

    // A later run must not clobber the operator's edits.
    ensure_config_file().unwrap();
    let loaded = load_config_inner().unwrap();
    assert_eq!(loaded.status_poll_ms, 4500);

    env::remove_var("CONFIG_PATH");
    let _ = fs::remove_file(&path);
  }
}
