//! doctab CLI - Turn a directory of PDFs into tables with an LLM.

use clap::Parser;
use doctab_cli::{exit_code, run_batch, Cli, Formatter, Settings};
use doctab_extractor::{ChunkCache, Pipeline};
use doctab_llm::LlmBackend;
use std::io::IsTerminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    // Variables already set in the environment win over .env
    dotenvy::dotenv().ok();

    // Initialize tracing (log to stderr)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let formatter = Formatter::new(!cli.no_color && std::io::stdout().is_terminal());

    match run(&cli, &formatter) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}", formatter.error(&format!("Error: {}", e)));
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli, formatter: &Formatter) -> doctab_cli::Result<i32> {
    let settings = Settings::load(cli)?;
    info!(
        "Input {}, output {}, cache {}",
        settings.run.input_dir.display(),
        settings.run.output_dir.display(),
        settings.run.cache_dir.display()
    );

    // Credentials are checked before any document is read
    let backend = LlmBackend::from_config(&settings.llm)?;

    std::fs::create_dir_all(&settings.run.output_dir)?;
    std::fs::create_dir_all(&settings.run.cache_dir)?;

    let pipeline = Pipeline::new(
        backend,
        ChunkCache::new(&settings.run.cache_dir),
        settings.pipeline.clone(),
    )?;

    let show_progress = !cli.quiet && std::io::stderr().is_terminal();
    let reports = run_batch(&pipeline, &settings.run, show_progress)?;

    println!("{}", formatter.summary(&reports));

    let code = exit_code(&reports);
    if code == 0 && !reports.is_empty() {
        println!(
            "{}",
            formatter.success(&format!(
                "Outputs written to {}",
                settings.run.output_dir.display()
            ))
        );
    }
    Ok(code)
}
