//! `interfacer.yaml` configuration.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scanner::with_default_excludes;
use crate::writer::{split_values, MethodSignature};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "interfacer.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("missing required setting `{0}`")]
    MissingField(&'static str),

    #[error("project dir {0} does not exist or is not a directory")]
    InvalidProjectDir(PathBuf),

    #[error("write path `{0}` must have the form `pkg.Type,path/to/file.go`")]
    InvalidWritePath(String),

    #[error("interface name `{0}` must be fully qualified, e.g. example.com/app/store.Store")]
    InvalidInterfaceName(String),

    #[error("invalid method `{method}`: {reason}")]
    InvalidMethod { method: String, reason: String },

    #[error("method returns {expected} value(s) but {found} default value(s) were given")]
    ReturnCountMismatch { expected: usize, found: usize },
}

/// A second module whose types also receive stubs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubModuleConfig {
    pub project_dir: PathBuf,
    pub project_module: String,
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
}

/// Settings for one `implement` run. Every field may also come from the
/// command line, which takes precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfacerConfig {
    /// Entries of the form `pkg.Type,path/to/file.go`.
    pub write_paths: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub project_dir: Option<PathBuf>,
    pub project_module: Option<String>,
    pub interface_full_name: Option<String>,
    pub new_method: Option<String>,
    /// Comma-separated Go expressions returned by every stub, e.g. `nil, nil`.
    pub return_default_values: Option<String>,
    pub sub_modules: Vec<SubModuleConfig>,
    pub enable_debug: bool,
    /// Log a record of every scanned struct and interface.
    pub enable_record: bool,
}

/// Validated settings with the required fields present.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub project_dir: PathBuf,
    pub project_module: String,
    pub interface_full_name: String,
    pub method: MethodSignature,
    pub return_defaults: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub write_paths: HashMap<String, PathBuf>,
    pub sub_modules: Vec<SubModuleConfig>,
    pub record: bool,
}

impl InterfacerConfig {
    /// Read a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Configured exclusions plus the directories every scan skips.
    pub fn effective_exclude_dirs(&self) -> Vec<String> {
        with_default_excludes(&self.exclude_dirs)
    }

    /// Parse `write_paths` into type name -> file.
    pub fn write_path_overrides(&self) -> Result<HashMap<String, PathBuf>, ConfigError> {
        let mut overrides = HashMap::new();
        for entry in &self.write_paths {
            let (name, path) = entry
                .split_once(',')
                .map(|(n, p)| (n.trim(), p.trim()))
                .filter(|(n, p)| !n.is_empty() && !p.is_empty())
                .ok_or_else(|| ConfigError::InvalidWritePath(entry.clone()))?;
            overrides.insert(name.to_string(), PathBuf::from(path));
        }
        Ok(overrides)
    }

    /// Check every setting and produce the values an `implement` run needs.
    pub fn validate(&self) -> Result<ResolvedConfig, ConfigError> {
        let project_dir = self.project_dir.clone().ok_or(ConfigError::MissingField("project_dir"))?;
        if !project_dir.is_dir() {
            return Err(ConfigError::InvalidProjectDir(project_dir));
        }
        let project_module = non_empty(&self.project_module).ok_or(ConfigError::MissingField("project_module"))?;
        let interface_full_name =
            non_empty(&self.interface_full_name).ok_or(ConfigError::MissingField("interface_full_name"))?;
        match interface_full_name.rsplit_once('.') {
            Some((package, name)) if !package.is_empty() && !name.is_empty() => {}
            _ => return Err(ConfigError::InvalidInterfaceName(interface_full_name)),
        }
        let method_text = non_empty(&self.new_method).ok_or(ConfigError::MissingField("new_method"))?;
        let method = MethodSignature::parse(&method_text).map_err(|err| ConfigError::InvalidMethod {
            method: method_text.clone(),
            reason: err.to_string(),
        })?;

        let return_defaults = split_values(self.return_default_values.as_deref().unwrap_or_default());
        if !return_defaults.is_empty() && return_defaults.len() != method.results.len() {
            return Err(ConfigError::ReturnCountMismatch {
                expected: method.results.len(),
                found: return_defaults.len(),
            });
        }

        for sub in &self.sub_modules {
            if !sub.project_dir.is_dir() {
                return Err(ConfigError::InvalidProjectDir(sub.project_dir.clone()));
            }
            if sub.project_module.trim().is_empty() {
                return Err(ConfigError::MissingField("sub_modules.project_module"));
            }
        }

        Ok(ResolvedConfig {
            project_dir,
            project_module,
            interface_full_name,
            method,
            return_defaults,
            exclude_dirs: self.effective_exclude_dirs(),
            write_paths: self.write_path_overrides()?,
            sub_modules: self.sub_modules.clone(),
            record: self.enable_record,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
