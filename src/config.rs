use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "rdoc-dictionary.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub stores: StoresConfig,
    pub build: BuildConfig,
    pub render: RenderConfig,
}

/// Filesystem locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Working directory holding the fragment cache and build output
    pub base_dir: PathBuf,
    /// Where the compiled bundle is synced to
    pub install_dir: PathBuf,
    /// Stylesheet handed to the compiler (embedded default when unset)
    pub stylesheet: Option<PathBuf>,
    /// Metadata descriptor handed to the compiler (embedded default when unset)
    pub metadata: Option<PathBuf>,
}

/// Documentation stores to read, in priority order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoresConfig {
    pub paths: Vec<PathBuf>,
}

/// External build and install settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub dictionary_name: String,
    pub compiler: PathBuf,
    pub sync_command: String,
    pub install: bool,
}

/// Rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Fully-qualified names whose comments are replaced by a placeholder
    pub excluded: Vec<String>,
    /// Superclass that is left out of class headings
    pub root_class: String,
    /// Entity name globs used by quick mode
    pub quick_patterns: Vec<String>,
}

/// Home-relative default, or an empty path that `validate` rejects
fn under_home(rel: &[&str]) -> PathBuf {
    match dirs::home_dir() {
        Some(home) => rel.iter().fold(home, |path, part| path.join(part)),
        None => PathBuf::new(),
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: under_home(&[".ri"]),
            install_dir: under_home(&["Library", "Dictionaries"]),
            stylesheet: None,
            metadata: None,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            dictionary_name: "RubyAndGems".to_string(),
            compiler: PathBuf::from(
                "/Developer/Extras/Dictionary Development Kit/bin/build_dict.sh",
            ),
            sync_command: "rsync".to_string(),
            install: true,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            excluded: vec![
                "ActiveRecord::ConnectionAdapters::Column::new".to_string(),
                "IRB::OutputMethod#parse_printf_format".to_string(),
                "IRB::SLex#postproc".to_string(),
                "StringScanner#pre_match".to_string(),
                "StringScanner#post_match".to_string(),
                "Transaction::Simple".to_string(),
            ],
            root_class: "Object".to_string(),
            quick_patterns: vec![
                "String*".to_string(),
                "Array*".to_string(),
                "Bignum*".to_string(),
            ],
        }
    }
}

impl PathsConfig {
    /// Directory holding one cached fragment per entity
    pub fn cache_dir(&self) -> PathBuf {
        self.base_dir.join("dict")
    }

    /// Assembled dictionary source document
    pub fn source_document(&self) -> PathBuf {
        self.base_dir.join("RubyGemsDictionary.xml")
    }

    /// Bundle produced by the compiler
    pub fn bundle(&self, dictionary_name: &str) -> PathBuf {
        self.base_dir
            .join("objects")
            .join(format!("{}.dictionary", dictionary_name))
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(&mut self, stores: Vec<PathBuf>, no_install: bool) {
        if !stores.is_empty() {
            self.stores.paths = stores;
        }

        if no_install {
            self.build.install = false;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.paths.base_dir.as_os_str().is_empty() {
            return Err(Error::config_validation(
                "could not determine home directory; set paths.base_dir",
            ));
        }

        if self.build.install && self.paths.install_dir.as_os_str().is_empty() {
            return Err(Error::config_validation(
                "could not determine home directory; set paths.install_dir",
            ));
        }

        if self.build.dictionary_name.trim().is_empty() {
            return Err(Error::config_validation("dictionary_name must not be empty"));
        }

        if self.build.compiler.as_os_str().is_empty() {
            return Err(Error::config_validation("compiler path must not be empty"));
        }

        if self.build.sync_command.trim().is_empty() {
            return Err(Error::config_validation("sync_command must not be empty"));
        }

        if self.render.quick_patterns.is_empty() {
            return Err(Error::config_validation("at least one quick pattern required"));
        }

        for pattern in &self.render.quick_patterns {
            glob::Pattern::new(pattern)?;
        }

        Ok(())
    }

    /// Compiled quick-mode patterns
    pub fn quick_patterns(&self) -> Result<Vec<glob::Pattern>> {
        self.render
            .quick_patterns
            .iter()
            .map(|p| glob::Pattern::new(p).map_err(Error::from))
            .collect()
    }
}
