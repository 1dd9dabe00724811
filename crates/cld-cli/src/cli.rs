//! CLI argument definitions.

use clap::Parser;

/// Extract causal relationships from text and render causal loop diagrams.
#[derive(Debug, Parser)]
#[command(name = "cld")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Generate a Graphviz DOT diagram (diagram.dot)
    #[arg(short, long)]
    pub diagram: bool,

    /// Write the final relationships to relationships.txt
    #[arg(short = 'w', long)]
    pub write_relationships: bool,

    /// Save the generated diagram as XMILE (diagram.xmile)
    #[arg(short, long)]
    pub xmile: bool,

    /// Similarity threshold for merging variable names (default 0.85)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Load pipeline configuration from a TOML file; flags override it
    #[arg(short, long)]
    pub config: Option<String>,

    /// Chat model to use
    #[arg(long, env = "OLLAMA_CHAT_MODEL")]
    pub llm_model: Option<String>,

    /// Embedding model to use
    #[arg(long, env = "OLLAMA_EMBEDDING_MODEL")]
    pub embedding_model: Option<String>,

    /// Random seed for deterministic runs
    #[arg(long, env = "SEED")]
    pub seed: Option<u64>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Nucleus sampling cutoff
    #[arg(long)]
    pub top_p: Option<f64>,

    /// Read input text from a file instead of stdin
    #[arg(short, long)]
    pub input: Option<String>,

    /// Ollama endpoint
    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    pub endpoint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["cld"]);
        assert!(cli.threshold.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
        assert!(!cli.diagram);
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_flags_parse() {
        let cli = Cli::parse_from([
            "cld", "-v", "-d", "-x", "-w", "-t", "0.9", "--llm-model", "mistral", "-i", "in.txt",
        ]);
        assert!(cli.verbose && cli.diagram && cli.xmile && cli.write_relationships);
        assert_eq!(cli.threshold, Some(0.9));
        assert_eq!(cli.llm_model.as_deref(), Some("mistral"));
        assert_eq!(cli.input.as_deref(), Some("in.txt"));
    }

    #[test]
    fn test_sampling_overrides() {
        let cli = Cli::parse_from(["cld", "--seed", "7", "--temperature", "0.2", "--top-p", "0.9"]);
        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.temperature, Some(0.2));
        assert_eq!(cli.top_p, Some(0.9));
    }
}
