//! npcsmith - Main entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use npcsmith_engine::infrastructure::config::{
    load_dotenv_from_repo_root, normalize_max_tokens, GeneratorConfig,
};
use npcsmith_engine::use_cases::RecordOutcome;
use npcsmith_engine::App;

/// Generate NPCs with a chat-completion model and create them as records.
#[derive(Debug, Parser)]
#[command(name = "npcsmith", version)]
struct Cli {
    /// Number of NPCs to generate.
    #[arg(short, long, default_value_t = 1)]
    count: u32,

    /// Free-text direction for the batch.
    #[arg(short, long)]
    prompt: Option<String>,

    /// Model override.
    #[arg(long, env = "NPC_MODEL")]
    model: Option<String>,

    #[arg(long)]
    temperature: Option<f32>,

    #[arg(long)]
    top_p: Option<f32>,

    /// Token limit; non-positive values use the default.
    #[arg(long, allow_negative_numbers = true)]
    max_tokens: Option<i64>,

    /// Write created records to this JSON file.
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Print created records to stdout.
    #[arg(long)]
    print: bool,
}

impl Cli {
    fn apply(&self, config: &mut GeneratorConfig) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(top_p) = self.top_p {
            config.top_p = top_p;
        }
        if self.max_tokens.is_some() {
            config.max_tokens = normalize_max_tokens(self.max_tokens);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "npcsmith_engine=info,npcsmith_domain=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = GeneratorConfig::from_env().context("Failed to load configuration")?;
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        model = %config.model,
        base_url = %config.base_url,
        rule_system = %config.rule_system,
        "Starting npcsmith"
    );

    let app = App::new(config);
    let request = app.request(cli.count, cli.prompt.clone())?;
    let outcome = app.generate_npcs.execute(&request).await?;

    for record in &outcome.records {
        if let RecordOutcome::Failed {
            index,
            name,
            failure,
        } = record
        {
            eprintln!(
                "NPC #{} ({}) failed: {}",
                index + 1,
                name.as_deref().unwrap_or("unnamed"),
                failure
            );
        }
    }
    println!("{}", outcome.summary);

    let document = app.exporter.export(outcome.export_records());
    if cli.print {
        println!("{}", document.to_json()?);
    }
    if let Some(path) = &cli.export {
        app.exporter
            .write_to_file(&document, path)
            .await
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        tracing::info!(path = %path.display(), records = document.len(), "Exported NPCs");
    }

    Ok(())
}
