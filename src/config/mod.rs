//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::{
    application::{
        fallback::FallbackPolicy,
        template::{DEFAULT_PARTIAL_BASE, DEFAULT_TEMPLATE_EXTENSION, TemplateNaming},
    },
    domain::locale::Locale,
};

pub use cli::{
    CliArgs, Command, ContentOverride, PostArgs, RenderArgs, ServeArgs, ServeOverrides,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "blockpreview";
const ENV_PREFIX: &str = "BLOCKPREVIEW";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
pub(crate) const DEFAULT_PREVIEW_PATH: &str = "/umbraco/backoffice/api/blockpreviewapi/previewmarkup";
const DEFAULT_PREVIEW_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub preview: PreviewSettings,
    pub content: ContentSettings,
    pub client: ClientSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
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

#[derive(Debug, Clone)]
pub struct PreviewSettings {
    /// Route of the preview endpoint; the visibility endpoint hangs below it.
    pub path: String,
    pub naming: TemplateNaming,
    /// Bound on one preview, page lookup and rendering included.
    pub timeout: Duration,
    pub fallback: FallbackPolicy,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub site_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub debounce: Duration,
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

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Render(args)) => raw.apply_content_override(&args.content),
        Some(Command::Post(_)) | None => {}
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    preview: RawPreviewSettings,
    content: RawContentSettings,
    client: RawClientSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(path) = overrides.preview_path.as_ref() {
            self.preview.path = Some(path.clone());
        }
        if let Some(timeout) = overrides.preview_timeout_ms {
            self.preview.timeout_ms = Some(timeout);
        }
        if let Some(culture) = overrides.preview_fallback_culture.as_ref() {
            self.preview.fallback_culture = Some(culture.clone());
        }
        self.apply_content_override(&overrides.content);
    }

    fn apply_content_override(&mut self, overrides: &ContentOverride) {
        if let Some(path) = overrides.site_file.as_ref() {
            self.content.site_file = Some(path.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            preview,
            content,
            client,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let preview = build_preview_settings(preview)?;
        let content = build_content_settings(content);
        let client = build_client_settings(client)?;

        Ok(Self {
            server,
            logging,
            preview,
            content,
            client,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
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

fn build_preview_settings(preview: RawPreviewSettings) -> Result<PreviewSettings, LoadError> {
    let path = preview
        .path
        .map(|path| path.trim().to_string())
        .unwrap_or_else(|| DEFAULT_PREVIEW_PATH.to_string());
    if !path.starts_with('/') || path.len() < 2 || path.ends_with('/') {
        return Err(LoadError::invalid(
            "preview.path",
            format!("`{path}` must start with `/`, not end with `/` and not be the root"),
        ));
    }

    let extension = preview
        .template_extension
        .unwrap_or_else(|| DEFAULT_TEMPLATE_EXTENSION.to_string());
    if extension.trim_start_matches('.').trim().is_empty() {
        return Err(LoadError::invalid(
            "preview.template_extension",
            "must not be empty",
        ));
    }
    let partial_base = preview
        .partial_base
        .unwrap_or_else(|| DEFAULT_PARTIAL_BASE.to_string());

    let timeout_ms = preview.timeout_ms.unwrap_or(DEFAULT_PREVIEW_TIMEOUT_MS);
    if timeout_ms == 0 {
        return Err(LoadError::invalid(
            "preview.timeout_ms",
            "must be greater than zero",
        ));
    }

    let fallback = match preview
        .fallback_culture
        .as_deref()
        .map(str::trim)
        .filter(|culture| !culture.is_empty())
    {
        Some(culture) => FallbackPolicy::Language(Locale::parse(culture).map_err(|err| {
            LoadError::invalid("preview.fallback_culture", err.to_string())
        })?),
        None => FallbackPolicy::None,
    };

    Ok(PreviewSettings {
        path,
        naming: TemplateNaming::new(partial_base, extension),
        timeout: Duration::from_millis(timeout_ms),
        fallback,
    })
}

fn build_content_settings(content: RawContentSettings) -> ContentSettings {
    ContentSettings {
        site_file: content
            .site_file
            .filter(|path| !path.as_os_str().is_empty()),
    }
}

fn build_client_settings(client: RawClientSettings) -> Result<ClientSettings, LoadError> {
    let debounce_ms = client.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS);
    if debounce_ms == 0 {
        return Err(LoadError::invalid(
            "client.debounce_ms",
            "must be greater than zero",
        ));
    }

    Ok(ClientSettings {
        debounce: Duration::from_millis(debounce_ms),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPreviewSettings {
    path: Option<String>,
    partial_base: Option<String>,
    template_extension: Option<String>,
    timeout_ms: Option<u64>,
    fallback_culture: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    site_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawClientSettings {
    debounce_ms: Option<u64>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}
