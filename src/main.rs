mod cli;

use vidiform::{
    collection::{CollectionManager, ManagerOptions},
    config,
    metadata::{Enricher, TmdbEnricher},
    probe::{self, Extractor, FfprobeExtractor},
};
use vidiform_common::{paths::is_video_file, record::FIXED_FIELDS, ExportFormat};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vidiform=trace,vidiform_common=debug".to_string()
        } else {
            "vidiform=debug".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Export {
            files,
            format,
            enrich,
            output,
            stdout,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(export_files(
                files,
                format.as_deref(),
                enrich,
                output,
                stdout,
                cli.config.as_deref(),
            ))
        }
        Commands::Probe { file, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_file(&file, json, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}

async fn export_files(
    files: Vec<PathBuf>,
    format: Option<&str>,
    enrich: bool,
    output: Option<PathBuf>,
    to_stdout: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let format = match format {
        Some(f) => f.parse::<ExportFormat>()?,
        None => config.export.default_format,
    };

    let mut handles = Vec::with_capacity(files.len());
    for path in &files {
        if !is_video_file(path) {
            tracing::warn!("Skipping non-video file: {:?}", path);
            continue;
        }
        let handle = probe::read_handle(path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?;
        handles.push(handle);
    }
    if handles.is_empty() {
        anyhow::bail!("No video files to import");
    }

    let extractor: Arc<dyn Extractor> =
        Arc::new(FfprobeExtractor::new(config.import.ffprobe_path.clone()));
    let enricher: Arc<dyn Enricher> = Arc::new(TmdbEnricher::from_config(&config.tmdb)?);
    let manager = CollectionManager::with_options(
        extractor,
        enricher.clone(),
        ManagerOptions::from_config(&config),
    );

    let imported = manager.import_files(handles).await?;
    tracing::info!("Imported {} file(s)", imported);

    if enrich {
        if !enricher.is_available() {
            anyhow::bail!(
                "Enrichment requires a TMDB API key (set {} or [tmdb] api_key)",
                config::TMDB_API_KEY_ENV
            );
        }
        for (name, outcome) in manager.enrich_all().await {
            match outcome {
                Ok(record) => tracing::info!("Enriched {} as {:?}", name, record.title),
                Err(e) => tracing::warn!("Could not enrich {}: {}", name, e),
            }
        }
    }

    let artifact = manager.export_artifact(format)?;
    if to_stdout {
        println!("{}", artifact.content);
    } else {
        let dir = output.unwrap_or(config.export.output_dir);
        let path = artifact.write_to(&dir)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

async fn probe_file(file: &Path, json: bool, config_path: Option<&Path>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let extractor = FfprobeExtractor::new(config.import.ffprobe_path);
    let handle = probe::read_handle(file).await?;
    let record = extractor.extract(&handle).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("File: {} ({} bytes, {})", handle.name, handle.size, handle.media_type);
        for field in FIXED_FIELDS {
            let value = record.text_value(field);
            if !value.is_empty() {
                println!("  {}: {}", field, value);
            }
        }
        for (name, value) in record.custom_fields() {
            println!("  {}: {}", name, value);
        }
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tools = probe::check_tools(&config.import.ffprobe_path);
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable metadata extraction.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!(
        "  TMDB: {} (language {}, timeout {}s)",
        if config.tmdb.has_api_key() {
            "API key set"
        } else {
            "no API key"
        },
        config.tmdb.language,
        config.tmdb.timeout_secs
    );
    println!(
        "  Import: concurrency {}, ffprobe {}",
        config.import.concurrency,
        config.import.ffprobe_path.display()
    );
    println!(
        "  Export: {} to {}",
        config.export.default_format,
        config.export.output_dir.display()
    );

    Ok(())
}
