#![allow(dead_code)]
#![allow(rustdoc::broken_intra_doc_links)]
//! # WordFreq Chat — Análise de Frequência de Palavras
//!
//! **Ponto de entrada principal** da aplicação.
//!
//! Recebe um documento (PDF, DOCX ou TXT), extrai o texto, conta as
//! palavras mais frequentes e permite conversar com um modelo local
//! (Ollama) sobre o resultado.
//!
//! ## Modos de Execução
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging
//!   ├── Lê a CLI (clap)
//!   ├── serve   → AppState + Router → axum::serve
//!   └── analyze → lê arquivo → analyze_file → JSON no stdout
//! ```
//!
//! ## Pipeline de Análise
//!
//! ```text
//! bytes ──► extract (pdf/docx/txt) ──► texto ──► ranker ──► FrequencyTable
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Interface web em http://localhost:8501
//! cargo run -- serve
//!
//! # Logs detalhados
//! RUST_LOG=debug cargo run -- serve --model mistral
//!
//! # Análise direta, formato antigo
//! cargo run -- analyze relatorio.pdf 10 --legacy
//! ```

/// Módulo `analysis` — orquestra extração + ranking e o resultado tagueado.
mod analysis;

/// Módulo `chat` — sessão de chat e cliente do Ollama.
mod chat;

/// Módulo `config` — CLI (clap) e configuração resolvida.
mod config;

/// Módulo `core` — tipos fundamentais: Document, FrequencyTable, AnalysisError.
mod core;

/// Módulo `extract` — extração de texto de PDF, DOCX e texto puro.
mod extract;

/// Módulo `ranker` — tokenização, stopwords e contagem.
mod ranker;

/// Módulo `web` — servidor web axum, handlers HTTP, templates e SSE.
mod web;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{AnalyzeArgs, Cli, Commands, Config, ServeArgs};
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Aceita RUST_LOG para configurar o nível. Logs vão para stderr,
    // deixando o stdout livre para o JSON do `analyze`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Serve(args) => serve(args).await,
        Commands::Analyze(args) => analyze(args),
    }
}

/// Inicia a interface web.
///
/// # Erros
///
/// Retorna erro se não conseguir criar o cliente HTTP, fazer bind no
/// endereço, ou se o servidor axum falhar durante execução.
async fn serve(args: ServeArgs) -> Result<()> {
    let config = Config::from(args);
    tracing::info!(
        bind = %config.bind,
        ollama = %config.ollama_url,
        models = ?config.models,
        "📊 WordFreq Chat — Starting..."
    );

    let bind = config.bind.clone();
    let state = AppState::new(config)?;
    let app = web::create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Falha ao fazer bind em {}", bind))?;
    tracing::info!("🚀 Server running at http://{}", bind);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Analisa um arquivo e imprime o resultado em JSON.
///
/// Falhas da análise (formato, extração, texto vazio) são impressas
/// como JSON e não mudam o código de saída; só a leitura do arquivo
/// pode falhar aqui.
fn analyze(args: AnalyzeArgs) -> Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Falha ao ler {}", args.file.display()))?;
    let filename = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let outcome = analysis::analyze_file(&filename, &bytes, args.top_n);
    if let analysis::AnalysisOutcome::Error { message } = &outcome {
        tracing::warn!(file = %args.file.display(), %message, "Análise falhou");
    }

    let json = if args.legacy {
        serde_json::to_string_pretty(&outcome.to_legacy_json())?
    } else {
        serde_json::to_string_pretty(&outcome)?
    };
    println!("{}", json);
    Ok(())
}
