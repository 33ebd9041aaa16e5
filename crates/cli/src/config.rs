//! Layered configuration: built-in defaults, then an optional TOML file, then
//! `LABINV_*` environment variables (`__` separates nested keys).

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use labinv_ai::DEFAULT_LOW_STOCK_THRESHOLD;
use labinv_inventory::LabIdentity;
use labinv_observability::LogFormat;

const DEFAULT_LAB_NAME: &str = "DNA Virology Lab";
const DEFAULT_ORGANIZATION: &str = "ICGEB China RRC";

/// Lab identity printed on labels and cover sheets.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LabConfig {
    #[serde(default = "default_lab_name")]
    pub name: String,
    #[serde(default)]
    pub organization: Option<String>,
}

fn default_lab_name() -> String {
    DEFAULT_LAB_NAME.into()
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            name: default_lab_name(),
            organization: Some(DEFAULT_ORGANIZATION.into()),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Root for `data/`, `data/backups/` and `exports/`.
    pub data_dir: PathBuf,
    #[serde(default)]
    pub lab: LabConfig,
    #[serde(default = "default_threshold")]
    pub low_stock_threshold: i64,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

impl AppConfig {
    /// Load from defaults, `config_file` (or `./labinv.*` if present) and the
    /// environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(
            config_file,
            Some(
                Environment::with_prefix("LABINV")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            ),
        )
    }

    pub(crate) fn load_from(
        config_file: Option<&Path>,
        env: Option<Environment>,
    ) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name("labinv").required(false),
        };

        let mut builder = Config::builder()
            .set_default(
                "data_dir",
                default_data_dir().to_string_lossy().into_owned(),
            )?
            .set_default("lab.name", DEFAULT_LAB_NAME)?
            .set_default("lab.organization", DEFAULT_ORGANIZATION)?
            .set_default("low_stock_threshold", DEFAULT_LOW_STOCK_THRESHOLD)?
            .set_default("log_format", "pretty")?
            .add_source(file);
        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        builder.build()?.try_deserialize()
    }

    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("data").join("lab_inventory.db")
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.data_dir.join("data").join("backups")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }

    pub fn lab_identity(&self) -> LabIdentity {
        LabIdentity::new(self.lab.name.clone(), self.lab.organization.clone())
    }
}

/// `{os data dir}/labinv`, falling back to `~/.local/share/labinv`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .map(|mut dir| {
            dir.push("labinv");
            dir
        })
        .unwrap_or_else(|| PathBuf::from("labinv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_file_or_env() {
        let cfg = AppConfig::load_from(None, None).unwrap();
        assert_eq!(cfg.lab, LabConfig::default());
        assert_eq!(cfg.low_stock_threshold, 10);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(cfg.data_dir.ends_with("labinv"));
        assert_eq!(
            cfg.lab_identity().display_name(),
            "DNA Virology Lab-ICGEB China RRC"
        );
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
data_dir = "/srv/lab"
low_stock_threshold = 3
log_format = "json"

[lab]
name = "Lab 5"
organization = ""
"#
        )
        .unwrap();

        let cfg = AppConfig::load_from(Some(file.path()), None).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/lab"));
        assert_eq!(cfg.low_stock_threshold, 3);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.lab_identity().display_name(), "Lab 5");
        assert_eq!(cfg.db_path(), PathBuf::from("/srv/lab/data/lab_inventory.db"));
        assert_eq!(cfg.backups_dir(), PathBuf::from("/srv/lab/data/backups"));
        assert_eq!(cfg.exports_dir(), PathBuf::from("/srv/lab/exports"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let missing = Path::new("/definitely/not/here/labinv.toml");
        assert!(AppConfig::load_from(Some(missing), None).is_err());
    }

    #[test]
    fn data_dir_flag_wins() {
        let cfg = AppConfig::load_from(None, None)
            .unwrap()
            .with_data_dir(Some(PathBuf::from("/tmp/elsewhere")));
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/elsewhere"));
    }
}
