/// The config module loads the TOML configuration file and validates its options.
///
/// Invalid values are reported with the offending key, and unrecognized keys are warned about
/// rather than rejected.
use crate::column::Column;
use crate::error::{MetaError, MetaExpectedError, Result};
use directories::ProjectDirs;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::warn;

pub const DEFAULT_SEARCH_COLUMNS: [Column; 6] =
    [Column::Title, Column::Artist, Column::Composer, Column::Album, Column::Genre, Column::Comment];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    #[default]
    Stderr,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive. `RUST_LOG` takes precedence when set.
    pub level: String,
    pub output: LogOutput,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            output: LogOutput::Stderr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Columns searched by terms without a `field:` prefix.
    pub default_search_columns: Vec<Column>,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_search_columns: DEFAULT_SEARCH_COLUMNS.to_vec(),
            logging: LoggingConfig::default(),
        }
    }
}

fn invalid(key: &str, path: &Path, message: impl std::fmt::Display) -> MetaError {
    MetaExpectedError::InvalidConfigValue {
        key: key.to_string(),
        message: format!("{} ({})", message, path.display()),
    }
    .into()
}

fn take_string(data: &mut Table, key: &str, accessor: &str, path: &Path) -> Result<Option<String>> {
    match data.remove(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(invalid(accessor, path, format!("must be a string: got {}", other.type_str()))),
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "amarok-meta").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads the configuration from the platform config directory.
    pub fn load() -> Result<Config> {
        let path = Config::default_path()
            .ok_or_else(|| MetaError::Generic("Failed to determine the configuration directory".to_string()))?;
        Config::parse_file(&path)
    }

    pub fn parse_file(path: &Path) -> Result<Config> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(MetaExpectedError::ConfigNotFound { path: path.to_path_buf() }.into());
            }
            Err(e) => return Err(e.into()),
        };
        Config::parse_str(path, &text)
    }

    /// Parses configuration text. `path` is only used in error messages.
    pub fn parse_str(path: &Path, text: &str) -> Result<Config> {
        let mut data: Table = text.parse()?;
        let mut config = Config::default();

        match data.remove("default_search_columns") {
            None => {}
            Some(Value::Array(values)) => {
                let mut columns = Vec::with_capacity(values.len());
                for value in values {
                    let name = value.as_str().ok_or_else(|| {
                        invalid("default_search_columns", path, format!("each column must be a string: got {}", value.type_str()))
                    })?;
                    let column = name.parse::<Column>().map_err(|e| invalid("default_search_columns", path, e))?;
                    columns.push(column);
                }
                config.default_search_columns = crate::common::uniq(columns);
            }
            Some(other) => {
                return Err(invalid("default_search_columns", path, format!("must be a list of column names: got {}", other.type_str())));
            }
        }

        match data.remove("logging") {
            None => {}
            Some(Value::Table(mut logging)) => {
                if let Some(level) = take_string(&mut logging, "level", "logging.level", path)? {
                    config.logging.level = level;
                }
                if let Some(output) = take_string(&mut logging, "output", "logging.output", path)? {
                    config.logging.output = match output.as_str() {
                        "stderr" => LogOutput::Stderr,
                        "file" => LogOutput::File,
                        _ => {
                            return Err(invalid("logging.output", path, format!("must be one of stderr, file: got {output}")));
                        }
                    };
                }
                if !logging.is_empty() {
                    data.insert("logging".to_string(), Value::Table(logging));
                }
            }
            Some(other) => {
                return Err(invalid("logging", path, format!("must be a table: got {}", other.type_str())));
            }
        }

        let unrecognized = unrecognized_accessors(&data);
        if !unrecognized.is_empty() {
            warn!("Unrecognized options found in configuration file: {}", unrecognized.join(", "));
        }
        Ok(config)
    }
}

/// Dotted paths of every leaf left in `data`, in sorted order.
pub(crate) fn unrecognized_accessors(data: &Table) -> Vec<String> {
    let mut accessors = Vec::new();
    let mut stack: Vec<(String, &Value)> = data.iter().map(|(k, v)| (k.clone(), v)).collect();
    while let Some((accessor, node)) = stack.pop() {
        match node {
            Value::Table(table) => {
                stack.extend(table.iter().map(|(k, v)| (format!("{accessor}.{k}"), v)));
            }
            _ => accessors.push(accessor),
        }
    }
    accessors.sort();
    accessors
}
