//! # Configuração e Linha de Comando
//!
//! A CLI tem dois subcomandos:
//!
//! ```text
//! wordfreq-chat serve   [--bind ADDR] [--ollama-url URL] [--model NAME]...
//! wordfreq-chat analyze <FILE> [TOP_N] [--legacy]
//! ```
//!
//! Todas as flags de `serve` também podem vir de variáveis de ambiente
//! (`WORDFREQ_BIND`, `OLLAMA_URL`, `OLLAMA_MODELS`, ...). Padrões:
//! Ollama em `localhost:11434`, modelos `llama3.1` e `qwen3:4b`,
//! timeouts de 30 s.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::analysis::DEFAULT_TOP_N;

/// Limites do slider de top-N na UI.
pub const TOP_N_RANGE: std::ops::RangeInclusive<usize> = 5..=100;

/// Análise de frequência de palavras com chat via Ollama.
#[derive(Parser, Debug)]
#[command(name = "wordfreq-chat", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inicia a interface web
    Serve(ServeArgs),
    /// Analisa um arquivo e imprime o JSON no stdout
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Endereço de escuta do servidor web
    #[arg(long, env = "WORDFREQ_BIND", default_value = "0.0.0.0:8501")]
    pub bind: String,

    /// URL base do servidor Ollama
    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Modelos oferecidos no seletor (o primeiro é o padrão)
    #[arg(
        long = "model",
        env = "OLLAMA_MODELS",
        value_delimiter = ',',
        default_values_t = [String::from("llama3.1"), String::from("qwen3:4b")]
    )]
    pub models: Vec<String>,

    /// Tempo máximo de uma análise (extração + ranking), em segundos
    #[arg(long, env = "WORDFREQ_ANALYSIS_TIMEOUT_SECS", default_value_t = 30)]
    pub analysis_timeout_secs: u64,

    /// Tempo máximo de uma consulta ao Ollama, em segundos
    #[arg(long, env = "OLLAMA_TIMEOUT_SECS", default_value_t = 30)]
    pub chat_timeout_secs: u64,

    /// Tamanho máximo de upload, em MB
    #[arg(long, env = "WORDFREQ_MAX_UPLOAD_MB", default_value_t = 50)]
    pub max_upload_mb: usize,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Arquivo PDF, DOCX ou TXT
    pub file: PathBuf,

    /// Número de palavras no ranking
    #[arg(default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Imprime no formato antigo (lista pura, ou `[{"error": ...}]`)
    #[arg(long)]
    pub legacy: bool,
}

/// Configuração resolvida do servidor.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind: String,
    pub ollama_url: String,
    /// Nunca vazio: o primeiro é o modelo padrão.
    pub models: Vec<String>,
    pub analysis_timeout: Duration,
    pub chat_timeout: Duration,
    pub max_upload_bytes: usize,
    pub default_top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8501".into(),
            ollama_url: "http://localhost:11434".into(),
            models: vec!["llama3.1".into(), "qwen3:4b".into()],
            analysis_timeout: Duration::from_secs(30),
            chat_timeout: Duration::from_secs(30),
            max_upload_bytes: 50 * 1024 * 1024,
            default_top_n: DEFAULT_TOP_N,
        }
    }
}

impl From<ServeArgs> for Config {
    fn from(args: ServeArgs) -> Self {
        let mut models: Vec<String> = args
            .models
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if models.is_empty() {
            models = Config::default().models;
        }
        Self {
            bind: args.bind,
            ollama_url: args.ollama_url,
            models,
            analysis_timeout: Duration::from_secs(args.analysis_timeout_secs),
            chat_timeout: Duration::from_secs(args.chat_timeout_secs),
            max_upload_bytes: args.max_upload_mb * 1024 * 1024,
            default_top_n: DEFAULT_TOP_N,
        }
    }
}

impl Config {
    /// Modelo padrão (primeiro da lista).
    pub fn default_model(&self) -> &str {
        self.models.first().map(String::as_str).unwrap_or("llama3.1")
    }

    /// Escolhe o modelo pedido pela UI, caindo no padrão se vazio.
    pub fn resolve_model<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested.map(str::trim) {
            Some(m) if !m.is_empty() => m,
            _ => self.default_model(),
        }
    }
}

/// Limita o top-N ao intervalo do slider.
pub fn clamp_top_n(top_n: usize) -> usize {
    top_n.clamp(*TOP_N_RANGE.start(), *TOP_N_RANGE.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["wordfreq-chat", "serve"]).unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        let cfg = Config::from(args);
        assert_eq!(cfg.models, vec!["llama3.1", "qwen3:4b"]);
        assert_eq!(cfg.default_model(), "llama3.1");
        assert_eq!(cfg.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(cfg.analysis_timeout, Duration::from_secs(30));
    }

    #[test]
    fn repeated_model_flags() {
        let cli = Cli::try_parse_from([
            "wordfreq-chat", "serve", "--model", "mistral", "--model", "phi3",
        ])
        .unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(Config::from(args).models, vec!["mistral", "phi3"]);
    }

    #[test]
    fn analyze_positional_args() {
        let cli =
            Cli::try_parse_from(["wordfreq-chat", "analyze", "doc.pdf", "7", "--legacy"]).unwrap();
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.file, PathBuf::from("doc.pdf"));
        assert_eq!(args.top_n, 7);
        assert!(args.legacy);
    }

    #[test]
    fn analyze_default_top_n() {
        let cli = Cli::try_parse_from(["wordfreq-chat", "analyze", "doc.txt"]).unwrap();
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.top_n, 20);
    }

    #[test]
    fn top_n_clamping() {
        assert_eq!(clamp_top_n(0), 5);
        assert_eq!(clamp_top_n(20), 20);
        assert_eq!(clamp_top_n(1000), 100);
    }

    #[test]
    fn model_resolution() {
        let cfg = Config::default();
        assert_eq!(cfg.resolve_model(Some("qwen3:4b")), "qwen3:4b");
        assert_eq!(cfg.resolve_model(Some("  ")), "llama3.1");
        assert_eq!(cfg.resolve_model(None), "llama3.1");
    }
}
