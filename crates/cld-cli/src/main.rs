//! cld - causal loop diagram generator for the command line.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use cld_llm::{OllamaEmbedder, OllamaReasoner, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL};
use cld_pipeline::{Pipeline, PipelineConfig};
use cld_render::{render_dot, render_xmile};
use std::io::Read;
use tracing::Level;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Log to stderr so diagram output on stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let source = read_source(cli.input.as_deref())?;
    if source.trim().is_empty() {
        anyhow::bail!("No input text provided");
    }

    let config = build_config(&cli)?;

    let chat_model = config.llm_model.as_deref().unwrap_or(DEFAULT_CHAT_MODEL);
    let embedding_model = config
        .embedding_model
        .as_deref()
        .unwrap_or(DEFAULT_EMBEDDING_MODEL);
    let reasoner = OllamaReasoner::new(&cli.endpoint, chat_model);
    let embedder = OllamaEmbedder::new(&cli.endpoint, embedding_model);

    let pipeline = Pipeline::new(reasoner, embedder, config)?;
    let outcome = pipeline.run(&source).await?;

    println!("Final Relationships:\n{}", outcome.numbered);

    if cli.write_relationships {
        std::fs::write("relationships.txt", &outcome.numbered)
            .context("Failed to write relationships.txt")?;
    }
    if cli.xmile {
        std::fs::write("diagram.xmile", render_xmile(&outcome.lines))
            .context("Failed to write diagram.xmile")?;
    }
    if cli.diagram {
        std::fs::write("diagram.dot", render_dot(&outcome.lines))
            .context("Failed to write diagram.dot")?;
    }

    Ok(())
}

/// Resolve the pipeline configuration: the TOML file named by `--config`
/// (defaults when absent), with explicit flags overriding file values.
fn build_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path))?;
            PipelineConfig::from_toml(&text).map_err(|e| anyhow::anyhow!(e))?
        }
        None => PipelineConfig::default(),
    };
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    if cli.llm_model.is_some() {
        config.llm_model = cli.llm_model.clone();
    }
    if cli.embedding_model.is_some() {
        config.embedding_model = cli.embedding_model.clone();
    }
    if let Some(temperature) = cli.temperature {
        config.temperature = temperature;
    }
    if let Some(top_p) = cli.top_p {
        config.top_p = top_p;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    Ok(config)
}

/// Read the input text from a file, or from stdin when no file is given.
fn read_source(input: Option<&str>) -> anyhow::Result<String> {
    match input {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
        }
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_build_config_defaults_without_file() {
        let cli = Cli::parse_from(["cld"]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.threshold, 0.85);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_build_config_loads_toml_file() {
        let file = config_file(
            "threshold = 0.9\n\
             llm_model = \"mistral\"\n\
             temperature = 0.0\n\
             top_p = 1.0\n\
             seed = 7\n",
        );
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from(["cld", "--config", &path]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.threshold, 0.9);
        assert_eq!(config.llm_model.as_deref(), Some("mistral"));
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_flags_override_config_file() {
        let file = config_file(
            "threshold = 0.9\n\
             llm_model = \"mistral\"\n\
             temperature = 0.0\n\
             top_p = 1.0\n",
        );
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from(["cld", "--config", &path, "-t", "0.7", "--seed", "9"]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.threshold, 0.7);
        assert_eq!(config.llm_model.as_deref(), Some("mistral"));
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_build_config_missing_file_errors() {
        let cli = Cli::parse_from(["cld", "--config", "/nonexistent/cld.toml"]);
        assert!(build_config(&cli).is_err());
    }
}
