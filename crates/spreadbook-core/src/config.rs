use std::collections::BTreeMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

pub const CONFIG_ENV_VAR: &str =
  "SPREADBOOK_CONFIG";

#[derive(Debug, Clone)]
pub struct Config {
  map: BTreeMap<String, String>,
  pub loaded_file: Option<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = BTreeMap::new();
    map.insert(
      "data.location".to_string(),
      "~/.spreadbook".to_string()
    );
    map.insert(
      "timezone".to_string(),
      "local".to_string()
    );
    map.insert(
      "color".to_string(),
      "on".to_string()
    );
    Self {
      map,
      loaded_file: None
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    match resolve_config_path(
      config_override
    ) {
      | Some(path) if path.exists() => {
        info!(config = %path.display(), "loading config");
        cfg.load_file(&path)?;
      }
      | Some(path)
        if config_override.is_some() =>
      {
        return Err(anyhow!(
          "config file {} does not \
           exist",
          path.display()
        ));
      }
      | _ => {
        warn!(
          "no config file found; \
           using defaults"
        );
      }
    }

    Ok(cfg)
  }

  /// Parses TOML text; nested tables
  /// become dotted keys.
  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();
    cfg.merge_toml(text)?;
    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k.trim().to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> Option<bool> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let text =
      fs::read_to_string(path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .merge_toml(&text)
      .with_context(|| {
        format!(
          "invalid config file {}",
          path.display()
        )
      })?;
    self.loaded_file =
      Some(path.to_path_buf());
    Ok(())
  }

  fn merge_toml(
    &mut self,
    text: &str
  ) -> anyhow::Result<()> {
    let table =
      toml::from_str::<toml::Table>(text)
        .context("failed to parse toml")?;
    flatten_into(
      &mut self.map,
      "",
      &table
    )
  }
}

fn flatten_into(
  map: &mut BTreeMap<String, String>,
  prefix: &str,
  table: &toml::Table
) -> anyhow::Result<()> {
  for (k, v) in table {
    let key = if prefix.is_empty() {
      k.clone()
    } else {
      format!("{prefix}.{k}")
    };

    let value = match v {
      | toml::Value::Table(nested) => {
        flatten_into(map, &key, nested)?;
        continue;
      }
      | toml::Value::String(s) => {
        s.clone()
      }
      | toml::Value::Integer(i) => {
        i.to_string()
      }
      | toml::Value::Boolean(b) => {
        (if *b { "on" } else { "off" })
          .to_string()
      }
      | other => {
        return Err(anyhow!(
          "unsupported value for \
           {key}: {other}"
        ));
      }
    };

    trace!(key = %key, value = %value, "loaded config key");
    map.insert(key, value);
  }
  Ok(())
}

#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  let dir = if let Some(path) =
    override_dir
  {
    path.to_path_buf()
  } else if let Some(cfg_value) =
    cfg.get("data.location")
  {
    expand_tilde(Path::new(&cfg_value))
  } else {
    default_data_dir()?
  };

  if !dir.exists() {
    info!(dir = %dir.display(), "creating data directory");
    fs::create_dir_all(&dir)
      .with_context(|| {
        format!(
          "failed to create {}",
          dir.display()
        )
      })?;
  }

  Ok(dir)
}

fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(expand_tilde(path));
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(expand_tilde(
        Path::new(trimmed)
      ));
    }
  }

  dirs::config_dir().map(|dir| {
    dir
      .join("spreadbook")
      .join("config.toml")
  })
}

fn default_data_dir()
-> anyhow::Result<PathBuf> {
  let home = dirs::home_dir()
    .ok_or_else(|| {
      anyhow!(
        "cannot determine home \
         directory"
      )
    })?;
  Ok(home.join(".spreadbook"))
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::{
    Config,
    resolve_data_dir
  };

  #[test]
  fn defaults_without_file() {
    let cfg = Config::default();
    assert_eq!(
      cfg.get("timezone").as_deref(),
      Some("local")
    );
    assert_eq!(
      cfg.get_bool("color"),
      Some(true)
    );
  }

  #[test]
  fn flattens_tables_into_dotted_keys()
  {
    let cfg = Config::from_toml_str(
      "timezone = \"Asia/Tokyo\"\n\
       color = false\n\
       [data]\n\
       location = \"/tmp/book\"\n"
    )
    .expect("parse config");

    assert_eq!(
      cfg.get("timezone").as_deref(),
      Some("Asia/Tokyo")
    );
    assert_eq!(
      cfg.get_bool("color"),
      Some(false)
    );
    assert_eq!(
      cfg.get("data.location").as_deref(),
      Some("/tmp/book")
    );
  }

  #[test]
  fn rejects_arrays() {
    assert!(
      Config::from_toml_str(
        "timezone = [\"UTC\"]"
      )
      .is_err()
    );
  }

  #[test]
  fn overrides_win_over_file_values() {
    let mut cfg = Config::from_toml_str(
      "timezone = \"UTC\""
    )
    .expect("parse config");
    cfg.apply_overrides(vec![(
      "timezone".to_string(),
      "Europe/Oslo".to_string()
    )]);
    assert_eq!(
      cfg.get("timezone").as_deref(),
      Some("Europe/Oslo")
    );
  }

  #[test]
  fn color_accepts_every_boolean_spelling() {
    let mut cfg = Config::default();
    for (raw, expected) in [
      ("y", true),
      ("yes", true),
      ("1", true),
      ("on", true),
      ("off", false),
      ("no", false),
      ("0", false)
    ] {
      cfg.apply_overrides(vec![(
        "color".to_string(),
        raw.to_string()
      )]);
      assert_eq!(
        cfg.get_bool("color"),
        Some(expected),
        "{raw}"
      );
    }
    assert_eq!(
      cfg.get_bool("missing"),
      None
    );
  }

  #[test]
  fn load_reads_explicit_file() {
    let temp = tempdir().expect("tempdir");
    let path =
      temp.path().join("config.toml");
    fs::write(
      &path,
      "[data]\nlocation = \"/srv/pages\"\n"
    )
    .expect("write config");

    let cfg = Config::load(Some(&path))
      .expect("load config");
    assert_eq!(
      cfg.loaded_file.as_deref(),
      Some(path.as_path())
    );
    assert_eq!(
      cfg.get("data.location").as_deref(),
      Some("/srv/pages")
    );
    assert!(
      Config::load(Some(
        &temp.path().join("missing.toml")
      ))
      .is_err()
    );
  }

  #[test]
  fn data_dir_override_is_created() {
    let temp = tempdir().expect("tempdir");
    let target =
      temp.path().join("pages");
    let dir = resolve_data_dir(
      &Config::default(),
      Some(&target)
    )
    .expect("resolve data dir");
    assert_eq!(dir, target);
    assert!(target.is_dir());
  }
}
