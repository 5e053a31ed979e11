use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the duomark binary.
#[derive(Debug, Parser)]
#[command(
    name = "duomark",
    version,
    about = "Markdown/HTML dual-representation tooling"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "DUOMARK_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: SettingsOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Convert Markdown to HTML with the transform pipeline.
    Render(RenderArgs),
    /// Entity-encode fenced code bodies.
    Preserve(InputArgs),
    /// Decode fenced code bodies encoded by `preserve`.
    Restore(InputArgs),
    /// Run a document through the full write path of an in-memory host and
    /// print the stored item as JSON.
    Save(SaveArgs),
    /// Report the early remote method and target item of an XML-RPC body.
    #[command(name = "inspect-payload")]
    InspectPayload(InputArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct InputArgs {
    /// Input file; `-` or absent reads stdin.
    #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Footnote namespace, usually the item id.
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,

    /// Treat fenced code bodies as raw text instead of entity-encoded.
    #[arg(long = "no-decode-code-blocks", action = clap::ArgAction::SetTrue)]
    pub no_decode_code_blocks: bool,

    /// Input is backslash-escaped; escape the output the same way.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub unslash: bool,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SaveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Item kind to save as.
    #[arg(long, default_value = "post", value_name = "KIND")]
    pub kind: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SettingsOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Toggle escaping of line-initial `* ` on save.
    #[arg(
        long = "list-escaping",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub list_escaping: Option<bool>,

    /// Toggle raw HTML passthrough in the renderer.
    #[arg(
        long = "renderer-unsafe-html",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub unsafe_html: Option<bool>,

    /// Override whether posting with Markdown starts enabled.
    #[arg(
        long = "posting-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub posting_enabled: Option<bool>,
}
