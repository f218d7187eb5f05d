//! CLI for flashedit - AI image editing.

use clap::{Args, Parser, Subcommand};
use flashedit::{EditedImage, ImageInput, PromptSuggestion, Studio, StudioConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flashedit")]
#[command(about = "Get AI editing ideas for an image and apply AI edits (Gemini)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log request details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest creative editing prompts for an image
    Suggest(SuggestArgs),

    /// Edit an image with a text prompt
    Edit(EditArgs),

    /// Check that the API key and models are usable
    Check,
}

#[derive(Args)]
struct SuggestArgs {
    /// Source image (PNG, JPEG, WebP or GIF)
    image: PathBuf,
}

#[derive(Args)]
struct EditArgs {
    /// Source image (PNG, JPEG, WebP or GIF)
    image: PathBuf,

    /// What to change
    #[arg(short, long, required_unless_present = "pick", conflicts_with = "pick")]
    prompt: Option<String>,

    /// Use the N-th suggested prompt instead of --prompt (1-based)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pick: Option<u32>,

    /// Output file path (default: flash-edit-<timestamp>.png)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut builder = StudioConfig::builder();
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout(Duration::from_secs(secs));
    }
    let studio = Studio::new(builder.build()?)?;

    match cli.command {
        Commands::Suggest(args) => suggest(&studio, args, cli.json).await?,
        Commands::Edit(args) => edit(&studio, args, cli.json).await?,
        Commands::Check => check(&studio, cli.json).await?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "flashedit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn suggest(studio: &Studio, args: SuggestArgs, json_output: bool) -> anyhow::Result<()> {
    let image = ImageInput::from_path(&args.image)?;
    let suggestions = studio.suggest_prompts(&image).await;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else if suggestions.is_empty() {
        println!("No suggestions available. Describe your own edit with `flashedit edit --prompt`.");
    } else {
        print_suggestions(&suggestions);
    }

    Ok(())
}

fn print_suggestions(suggestions: &[PromptSuggestion]) {
    for (i, s) in suggestions.iter().enumerate() {
        println!("{}. {} [{}]", i + 1, s.title, s.category);
        println!("   {}", s.prompt);
    }
}

async fn edit(studio: &Studio, args: EditArgs, json_output: bool) -> anyhow::Result<()> {
    let image = ImageInput::from_path(&args.image)?;

    let prompt = match (args.prompt, args.pick) {
        (Some(prompt), _) => prompt,
        (None, Some(n)) => {
            let suggestions = studio.suggest_prompts(&image).await;
            let index = n as usize - 1;
            match suggestions.into_iter().nth(index) {
                Some(s) => {
                    if !json_output {
                        println!("Using suggestion {n}: {}", s.title);
                    }
                    s.prompt
                }
                None => anyhow::bail!(
                    "suggestion {n} is not available; pass --prompt to describe the edit yourself"
                ),
            }
        }
        (None, None) => anyhow::bail!("either --prompt or --pick is required"),
    };

    let edited = studio.edit_image(&image, &prompt).await?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(EditedImage::default_download_name()));
    edited.save(&output)?;

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "output": output.display().to_string(),
            "prompt": prompt,
            "model": studio.edit_model(),
            "mime_type": edited.reported_mime_type(),
            "model_text": edited.model_text(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Edited image: {}", output.display());
        if let Some(text) = edited.model_text() {
            println!("Model note: {text}");
        }
    }

    Ok(())
}

async fn check(studio: &Studio, json_output: bool) -> anyhow::Result<()> {
    studio.health_check().await?;

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "edit_model": studio.edit_model(),
            "suggestion_model": studio.suggestion_model(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("✓ {} (edit)", studio.edit_model());
        println!("✓ {} (suggestions)", studio.suggestion_model());
    }

    Ok(())
}
