//! Layered run configuration
//!
//! Precedence, highest first:
//! 1. command-line flags
//! 2. environment (`GOBIN`, `GOPATH`, `GOPROXY`, home directory)
//! 3. the TOML config file
//! 4. built-in defaults

use crate::cli::CliArgs;
use crate::domain::Mode;
use crate::error::ConfigError;
use crate::installer::DEFAULT_LDFLAGS;
use crate::registry::{DEFAULT_TIMEOUT, GO_PROXY_URL};
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file name inside the per-user config directory
const CONFIG_FILE: &str = "config.toml";

/// Contents of the TOML config file
///
/// ```toml
/// bin_dirs = ["~/go/bin", "$HOME/.local/gobin"]
/// proxy = "https://goproxy.io"
/// timeout_secs = 20
/// ldflags = "-s -w"
/// trimpath = true
/// go = "/usr/local/go/bin/go"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Binary directories, each may be a path list
    pub bin_dirs: Vec<String>,
    /// Module proxy base URL
    pub proxy: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Linker flags
    pub ldflags: Option<String>,
    /// Pass -trimpath
    pub trimpath: Option<bool>,
    /// Go executable
    pub go: Option<String>,
}

impl FileConfig {
    /// Parse config file contents
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e: toml::de::Error| ConfigError::InvalidConfigFile {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Load a config file that must exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidConfigFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::parse(&content, path)
    }

    /// Load the explicit file, or the default file when it exists
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("Loading config from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// `<config dir>/binup/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME")).join(CONFIG_FILE))
}

/// Snapshot of the environment the configuration reads
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: HashMap<String, String>,
    home: Option<PathBuf>,
}

impl Env {
    /// Capture the process environment
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
            home: dirs::home_dir(),
        }
    }

    /// Set a variable
    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    /// Set the home directory
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Non-empty value of a variable
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Home directory
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Expand `~` and `$VAR`; unknown variables are left as written
    pub fn expand(&self, raw: &str) -> Result<String, ConfigError> {
        let home = || self.home.as_ref().map(|h| h.to_string_lossy().into_owned());
        let lookup = |name: &str| Ok::<_, Infallible>(self.var(name).map(str::to_string));

        shellexpand::full_with_context(raw, home, lookup)
            .map(|s| s.into_owned())
            .map_err(|e| ConfigError::InvalidPath {
                path: raw.to_string(),
                message: e.to_string(),
            })
    }

    /// Expand, then split a path list into its entries
    pub fn expand_path_list(&self, raw: &str) -> Result<Vec<PathBuf>, ConfigError> {
        let expanded = self.expand(raw)?;
        Ok(std::env::split_paths(&expanded)
            .filter(|p| !p.as_os_str().is_empty())
            .collect())
    }
}

/// Resolved configuration for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Run mode
    pub mode: Mode,
    /// Explicit targets, empty for discovery
    pub targets: Vec<String>,
    /// Directories to scan in discovery mode
    pub bin_dirs: Vec<PathBuf>,
    /// Module proxy base URL
    pub proxy: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Linker flags for go install
    pub ldflags: String,
    /// Pass -trimpath to go install
    pub trimpath: bool,
    /// Go executable
    pub go: String,
    /// Verbose output
    pub verbose: bool,
    /// Quiet output
    pub quiet: bool,
    /// JSON output
    pub json: bool,
}

impl Config {
    /// Resolve the configuration from flags, the process environment and the config file
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let file = FileConfig::discover(args.config.as_deref())?;
        Self::from_parts(args, file, &Env::from_process())
    }

    /// Resolve the configuration from already loaded layers
    pub fn from_parts(args: &CliArgs, file: FileConfig, env: &Env) -> Result<Self, ConfigError> {
        if args.dry_run && args.reinstall {
            return Err(ConfigError::ConflictingOptions {
                message: "--dry-run and --reinstall cannot be combined".to_string(),
            });
        }

        let bin_dirs = resolve_bin_dirs(args.gobin.as_deref(), &file.bin_dirs, env)?;
        let proxy = resolve_proxy(args.proxy.as_deref(), file.proxy.as_deref(), env)?;
        let timeout = args
            .timeout
            .or(file.timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(Self {
            mode: args.mode(),
            targets: args.targets.clone(),
            bin_dirs,
            proxy,
            timeout,
            ldflags: args
                .ldflags
                .clone()
                .or(file.ldflags)
                .unwrap_or_else(|| DEFAULT_LDFLAGS.to_string()),
            trimpath: args.trimpath.or(file.trimpath).unwrap_or(true),
            go: args.go.clone().or(file.go).unwrap_or_else(|| "go".to_string()),
            verbose: args.verbose,
            quiet: args.quiet,
            json: args.json,
        })
    }

    /// Directories to scan, failing when none could be resolved
    pub fn require_bin_dirs(&self) -> Result<&[PathBuf], ConfigError> {
        if self.bin_dirs.is_empty() {
            Err(ConfigError::NoBinaryDirectory)
        } else {
            Ok(&self.bin_dirs)
        }
    }
}

/// First non-empty source wins: flag, file, `GOBIN`, `GOPATH` entries, `~/go/bin`
fn resolve_bin_dirs(
    flag: Option<&str>,
    file: &[String],
    env: &Env,
) -> Result<Vec<PathBuf>, ConfigError> {
    if let Some(raw) = flag.filter(|s| !s.trim().is_empty()) {
        return env.expand_path_list(raw);
    }

    if !file.is_empty() {
        let mut dirs = Vec::new();
        for raw in file {
            dirs.extend(env.expand_path_list(raw)?);
        }
        if !dirs.is_empty() {
            return Ok(dirs);
        }
    }

    if let Some(raw) = env.var("GOBIN") {
        return env.expand_path_list(raw);
    }

    if let Some(raw) = env.var("GOPATH") {
        let dirs: Vec<PathBuf> = env
            .expand_path_list(raw)?
            .into_iter()
            .map(|p| p.join("bin"))
            .collect();
        if !dirs.is_empty() {
            return Ok(dirs);
        }
    }

    Ok(env
        .home()
        .map(|home| vec![home.join("go").join("bin")])
        .unwrap_or_default())
}

/// Flag, then the first http(s) entry of `GOPROXY`, then the file, then the public proxy
fn resolve_proxy(flag: Option<&str>, file: Option<&str>, env: &Env) -> Result<String, ConfigError> {
    if let Some(value) = flag {
        return validate_proxy_url(value);
    }
    if let Some(value) = env.var("GOPROXY").and_then(first_http_proxy) {
        return validate_proxy_url(value);
    }
    if let Some(value) = file {
        return validate_proxy_url(value);
    }
    Ok(GO_PROXY_URL.to_string())
}

/// Pick the first usable entry of a `GOPROXY` list.
///
/// Entries are separated by `,` or `|`; `direct`, `off` and non-HTTP entries
/// such as `file://` are not queried.
pub fn first_http_proxy(goproxy: &str) -> Option<&str> {
    goproxy
        .split([',', '|'])
        .map(str::trim)
        .find(|entry| entry.starts_with("https://") || entry.starts_with("http://"))
}

fn validate_proxy_url(value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    match reqwest::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(value.trim_end_matches('/').to_string())
        }
        _ => Err(ConfigError::InvalidProxyUrl {
            value: value.to_string(),
        }),
    }
}
