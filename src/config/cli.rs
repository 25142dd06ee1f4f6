use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the blockpreview binary.
#[derive(Debug, Parser)]
#[command(
    name = "blockpreview",
    version,
    about = "Live previews of content blocks for the editor"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "BLOCKPREVIEW_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the preview HTTP service.
    Serve(Box<ServeArgs>),
    /// Render one block data file through the preview pipeline and print the result.
    Render(RenderArgs),
    /// Send one block data file to a running preview service.
    Post(PostArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ContentOverride {
    /// Override the site content file.
    #[arg(long = "content-site-file", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub site_file: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub content: ContentOverride,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the preview endpoint path.
    #[arg(long = "preview-path", value_name = "PATH")]
    pub preview_path: Option<String>,

    /// Override the per-preview timeout in milliseconds.
    #[arg(long = "preview-timeout-ms", value_name = "MS")]
    pub preview_timeout_ms: Option<u64>,

    /// Culture consulted when a variant property has no value for the bound culture.
    #[arg(long = "preview-fallback-culture", value_name = "CULTURE")]
    pub preview_fallback_culture: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub content: ContentOverride,

    /// Page the block belongs to; zero or less means the page is unsaved.
    #[arg(long = "page-id", value_name = "ID", allow_negative_numbers = true)]
    pub page_id: i64,

    /// Culture to render the block in.
    #[arg(long, value_name = "CULTURE", default_value = "")]
    pub culture: String,

    /// Block data JSON file.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct PostArgs {
    /// Base URL of the preview service.
    #[arg(long, value_name = "URL", value_hint = ValueHint::Url)]
    pub server: String,

    #[arg(long = "page-id", value_name = "ID", allow_negative_numbers = true)]
    pub page_id: i64,

    #[arg(long, value_name = "CULTURE", default_value = "")]
    pub culture: String,

    /// Block data JSON file.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}
