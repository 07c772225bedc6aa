//! # Postmock
//!
//! Renders social post mockups to PNG.

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use post_cli::{build_post, CliArgs, Command, HistoryCommand, RenderArgs, DEFAULT_LOG_FILTER};
use post_core::{Post, PostHistory, PostStyle, Stage};
use post_renderer::{DirectorySink, ExportConfig, ExportPipeline};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    tracing::debug!("Output directory: {}", args.out.display());

    match &args.command {
        Command::Render(render) => run_render(&args.out, render),
        Command::History(command) => run_history(&args.out, &args.data_dir, command),
    }
}

fn run_render(out: &Path, args: &RenderArgs) -> anyhow::Result<()> {
    let post = build_post(&args.post)?;
    let pipeline = ExportPipeline::new(ExportConfig::from(args));
    let mut stage = Stage::new();

    if args.data_uri {
        let image = pipeline
            .render(&mut stage, post.to_document(args.style))
            .context("rendering post")?;
        println!("{}", image.data_uri());
        return Ok(());
    }

    export(&pipeline, &mut stage, &post, args.style, out, &args.file_name)
}

fn run_history(out: &Path, data_dir: &Path, command: &HistoryCommand) -> anyhow::Result<()> {
    let mut history = PostHistory::open(data_dir)
        .with_context(|| format!("opening history in {}", data_dir.display()))?;

    match command {
        HistoryCommand::List { json } => {
            if *json {
                println!("{}", serde_json::to_string_pretty(history.posts())?);
            } else if history.is_empty() {
                println!("No saved posts");
            } else {
                for post in history.posts() {
                    let first_line = post.text.lines().next().unwrap_or_default();
                    println!(
                        "{}  {}  {} image(s)  {first_line}",
                        post.id,
                        post.export_file_name(),
                        post.images.len(),
                    );
                }
            }
        }
        HistoryCommand::Add(post_args) => {
            let post = build_post(post_args)?;
            let id = history.add(post)?;
            println!("{id}");
        }
        HistoryCommand::Delete { id } => {
            history.delete(*id)?;
            tracing::info!("Deleted post {id}");
        }
        HistoryCommand::Clear => {
            let count = history.len();
            history.clear()?;
            tracing::info!("Cleared {count} post(s)");
        }
        HistoryCommand::Export {
            id,
            style,
            file_name,
        } => {
            let post = history
                .get(*id)
                .with_context(|| format!("post {id} not found"))?;
            let file_name = file_name.clone().unwrap_or_else(|| post.export_file_name());
            let pipeline = ExportPipeline::new(ExportConfig::default());
            let mut stage = Stage::new();
            export(&pipeline, &mut stage, post, *style, out, &file_name)?;
        }
    }
    Ok(())
}

fn export(
    pipeline: &ExportPipeline,
    stage: &mut Stage,
    post: &Post,
    style: PostStyle,
    out: &Path,
    file_name: &str,
) -> anyhow::Result<()> {
    let mut sink = DirectorySink::new(out);
    match pipeline.export_document(stage, post.to_document(style), file_name, &mut sink) {
        Some(download) => {
            if let Some(path) = download.location {
                println!("{}", path.display());
            }
            Ok(())
        }
        None => anyhow::bail!("Error generating image"),
    }
}
