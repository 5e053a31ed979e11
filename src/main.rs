use std::{path::Path, process, sync::Arc};

use duomark::{
    application::{
        engine::{EngineOptions, MarkdownEngine},
        error::AppError,
        remote::{EarlyTarget, RemoteCall, detect_early_target, parse_call},
        render::{
            ComrakRenderer, TransformContext, TransformHooks, codeblock_preserve,
            codeblock_restore,
        },
        sync::{EditableView, WriteOptions},
    },
    config,
    domain::{
        entities::{ContentItem, ItemDraft},
        types::ItemKind,
    },
    infra::{
        error::InfraError,
        memory::{MemoryHost, MemoryObjectCache},
        sanitize::AmmoniaFilters,
        telemetry,
    },
};
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

const SOURCE: &str = "duomark::cli";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    if dispatcher::has_been_set() {
        error!(error = %report.chain(), "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %report.chain(), "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match cli_args.command {
        config::Command::Render(args) => run_render(settings, args).await,
        config::Command::Preserve(args) => {
            let input = read_input(&args).await?;
            write_output(&codeblock_preserve(&input)).await
        }
        config::Command::Restore(args) => {
            let input = read_input(&args).await?;
            write_output(&codeblock_restore(&input)).await
        }
        config::Command::Save(args) => run_save(settings, args).await,
        config::Command::InspectPayload(args) => run_inspect_payload(args).await,
    }
}

async fn run_render(settings: config::Settings, args: config::RenderArgs) -> Result<(), AppError> {
    let input = read_input(&args.input).await?;
    let engine = build_engine(&settings).await?;

    let ctx = TransformContext {
        id: args.id,
        unslash: args.unslash,
        decode_code_blocks: !args.no_decode_code_blocks,
    };
    let mut html = engine.transform(&input, &ctx);
    html.push('\n');
    write_output(&html).await
}

#[derive(Serialize)]
struct SaveReport {
    item: ContentItem,
    markdown: bool,
    editable: Option<EditableView>,
}

async fn run_save(settings: config::Settings, args: config::SaveArgs) -> Result<(), AppError> {
    let kind = ItemKind::from(args.kind.as_str());
    if kind.as_str().is_empty() {
        return Err(AppError::validation("item kind must not be empty"));
    }

    let input = read_input(&args.input).await?;
    let engine = build_engine(&settings).await?;

    let item = engine
        .save(ItemDraft::new(kind, input), WriteOptions::editor())
        .await?;
    let markdown = engine.registry().is_markdown(item.id).await;
    let editable = engine.editable_view(item.id).await?;
    info!(target = SOURCE, item = %item.id, markdown, "item saved");

    write_json(&SaveReport {
        item,
        markdown,
        editable,
    })
    .await
}

#[derive(Serialize)]
struct PayloadReport {
    call: RemoteCall,
    early: Option<EarlyTarget>,
}

async fn run_inspect_payload(args: config::InputArgs) -> Result<(), AppError> {
    let raw = read_input(&args).await?;
    let call = parse_call(&raw)?;
    let early = detect_early_target(&raw)?;
    write_json(&PayloadReport { call, early }).await
}

/// In-memory host seeded from the resolved settings.
async fn build_engine(settings: &config::Settings) -> Result<MarkdownEngine, AppError> {
    let cache = Arc::new(MemoryObjectCache::from_settings(&settings.cache));
    let host = Arc::new(MemoryHost::new().with_cache(cache));

    let engine = MarkdownEngine::new(
        host.adapters(Arc::new(AmmoniaFilters::new())),
        Arc::new(ComrakRenderer::new(&settings.renderer)),
        TransformHooks::new(),
        EngineOptions::from(&settings.markdown),
    );

    engine
        .registry()
        .set_posting_enabled(settings.markdown.posting_enabled)
        .await?;
    engine
        .registry()
        .set_commenting_enabled(settings.markdown.commenting_enabled)
        .await?;

    Ok(engine)
}

async fn read_input(args: &config::InputArgs) -> Result<String, AppError> {
    match args.input.as_deref() {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .map_err(|err| AppError::from(InfraError::from(err))),
        _ => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .map_err(|err| AppError::from(InfraError::from(err)))?;
            Ok(buffer)
        }
    }
}

async fn write_output(text: &str) -> Result<(), AppError> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(text.as_bytes())
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    stdout
        .flush()
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))
}

async fn write_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let mut json = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))?;
    json.push('\n');
    write_output(&json).await
}
