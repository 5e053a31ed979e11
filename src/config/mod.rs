//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{num::NonZeroUsize, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::domain::types::ItemKind;

pub use cli::{CliArgs, Command, InputArgs, RenderArgs, SaveArgs, SettingsOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "duomark";
const DEFAULT_CACHE_CAPACITY: usize = 1024;
pub const DEFAULT_SUPPORT_URL: &str = "https://en.support.wordpress.com/markdown-quick-reference/";
pub const DEFAULT_SUPPORTED_KINDS: [&str; 3] = ["post", "page", "revision"];
pub const DEFAULT_STRUCTURED_MARKERS: [&str; 1] = ["<!-- wp:"];

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub markdown: MarkdownSettings,
    pub renderer: RendererSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownSettings {
    pub supported_kinds: Vec<ItemKind>,
    pub list_escaping: bool,
    pub structured_markers: Vec<String>,
    pub support_url: String,
    /// Initial scope toggles for hosts that seed their settings from here.
    pub posting_enabled: bool,
    pub commenting_enabled: bool,
}

impl Default for MarkdownSettings {
    fn default() -> Self {
        Self {
            supported_kinds: DEFAULT_SUPPORTED_KINDS
                .iter()
                .map(|kind| ItemKind::from(*kind))
                .collect(),
            list_escaping: false,
            structured_markers: DEFAULT_STRUCTURED_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
            support_url: DEFAULT_SUPPORT_URL.to_string(),
            posting_enabled: false,
            commenting_enabled: false,
        }
    }
}

/// GFM extensions handed to the comrak renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererSettings {
    pub footnotes: bool,
    pub tables: bool,
    pub strikethrough: bool,
    pub autolink: bool,
    pub tasklist: bool,
    pub unsafe_html: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            footnotes: true,
            tables: true,
            strikethrough: true,
            autolink: true,
            tasklist: true,
            unsafe_html: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub persistent: bool,
    pub capacity: NonZeroUsize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            persistent: false,
            capacity: NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix("DUOMARK")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("markdown.supported_kinds")
            .with_list_parse_key("markdown.structured_markers")
            .try_parsing(true),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for
/// downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    markdown: RawMarkdownSettings,
    renderer: RawRendererSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(enabled) = overrides.list_escaping {
            self.markdown.list_escaping = Some(enabled);
        }
        if let Some(enabled) = overrides.posting_enabled {
            self.markdown.posting_enabled = Some(enabled);
        }
        if let Some(enabled) = overrides.unsafe_html {
            self.renderer.unsafe_html = Some(enabled);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            markdown,
            renderer,
            cache,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            markdown: build_markdown_settings(markdown)?,
            renderer: build_renderer_settings(renderer),
            cache: build_cache_settings(cache)?,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logging: LoggingSettings {
                level: LevelFilter::INFO,
                format: LogFormat::Compact,
            },
            markdown: MarkdownSettings::default(),
            renderer: RendererSettings::default(),
            cache: CacheSettings::default(),
        }
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_markdown_settings(markdown: RawMarkdownSettings) -> Result<MarkdownSettings, LoadError> {
    let defaults = MarkdownSettings::default();

    let supported_kinds = match markdown.supported_kinds {
        Some(kinds) => {
            let mut parsed = Vec::with_capacity(kinds.len());
            for kind in kinds {
                let trimmed = kind.trim();
                if trimmed.is_empty() {
                    return Err(LoadError::invalid(
                        "markdown.supported_kinds",
                        "kinds must not be empty",
                    ));
                }
                let kind = ItemKind::from(trimmed);
                if !parsed.contains(&kind) {
                    parsed.push(kind);
                }
            }
            parsed
        }
        None => defaults.supported_kinds,
    };

    let structured_markers = match markdown.structured_markers {
        Some(markers) => markers
            .into_iter()
            .filter(|marker| !marker.trim().is_empty())
            .collect(),
        None => defaults.structured_markers,
    };

    let support_url = match markdown.support_url {
        Some(url) => {
            let trimmed = url.trim();
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                return Err(LoadError::invalid(
                    "markdown.support_url",
                    "must be an http(s) URL",
                ));
            }
            trimmed.to_string()
        }
        None => defaults.support_url,
    };

    Ok(MarkdownSettings {
        supported_kinds,
        list_escaping: markdown.list_escaping.unwrap_or(defaults.list_escaping),
        structured_markers,
        support_url,
        posting_enabled: markdown.posting_enabled.unwrap_or(defaults.posting_enabled),
        commenting_enabled: markdown
            .commenting_enabled
            .unwrap_or(defaults.commenting_enabled),
    })
}

fn build_renderer_settings(renderer: RawRendererSettings) -> RendererSettings {
    let defaults = RendererSettings::default();
    RendererSettings {
        footnotes: renderer.footnotes.unwrap_or(defaults.footnotes),
        tables: renderer.tables.unwrap_or(defaults.tables),
        strikethrough: renderer.strikethrough.unwrap_or(defaults.strikethrough),
        autolink: renderer.autolink.unwrap_or(defaults.autolink),
        tasklist: renderer.tasklist.unwrap_or(defaults.tasklist),
        unsafe_html: renderer.unsafe_html.unwrap_or(defaults.unsafe_html),
    }
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let defaults = CacheSettings::default();
    let capacity = match cache.capacity {
        Some(value) => NonZeroUsize::new(value)
            .ok_or_else(|| LoadError::invalid("cache.capacity", "must be greater than zero"))?,
        None => defaults.capacity,
    };

    Ok(CacheSettings {
        persistent: cache.persistent.unwrap_or(defaults.persistent),
        capacity,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMarkdownSettings {
    supported_kinds: Option<Vec<String>>,
    list_escaping: Option<bool>,
    structured_markers: Option<Vec<String>>,
    support_url: Option<String>,
    posting_enabled: Option<bool>,
    commenting_enabled: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRendererSettings {
    footnotes: Option<bool>,
    tables: Option<bool>,
    strikethrough: Option<bool>,
    autolink: Option<bool>,
    tasklist: Option<bool>,
    unsafe_html: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    persistent: Option<bool>,
    capacity: Option<usize>,
}
