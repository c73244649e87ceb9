//! # Estado da Aplicação Web
//!
//! Define as structs de estado compartilhado entre todos os handlers Axum.
//!
//! ## Workspace Único
//!
//! A aplicação atende um usuário por vez. O documento atual, sua
//! análise e o histórico do chat ficam em um único [`Workspace`],
//! substituído a cada novo upload:
//!
//! ```text
//! AppState
//!  ├── config      (imutável)
//!  ├── ollama      (cliente HTTP, clonável)
//!  ├── workspace   Mutex<Option<Workspace>>
//!  │                 ├── filename, top_n, outcome
//!  │                 └── chat: ChatSession
//!  └── events_tx   broadcast → /events (SSE)
//! ```
//!
//! O lock do workspace nunca é mantido através de um `.await`: os
//! handlers clonam o que precisam, soltam o lock, e gravam de volta.

use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::analysis::AnalysisOutcome;
use crate::chat::{ChatContext, ChatSession, OllamaClient};
use crate::config::Config;
use crate::web::events::AnalysisEvent;

/// Documento atual + análise + conversa.
#[derive(Clone, Debug)]
pub struct Workspace {
    /// Identifica a análise (também presente nos eventos SSE).
    pub analysis_id: Uuid,
    /// Nome do arquivo enviado.
    pub filename: String,
    /// Tamanho do upload em bytes.
    pub size_bytes: usize,
    /// Top-N usado (já limitado ao intervalo do slider).
    pub top_n: usize,
    /// Resultado da análise.
    pub outcome: AnalysisOutcome,
    /// Histórico do chat sobre este documento.
    pub chat: ChatSession,
}

impl Workspace {
    /// Contexto para o chat, se a análise teve sucesso.
    pub fn chat_context(&self) -> Option<ChatContext> {
        self.outcome.table().map(|table| ChatContext {
            filename: self.filename.clone(),
            top_n: self.top_n,
            table: table.clone(),
        })
    }
}

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    /// Configuração resolvida da CLI/ambiente.
    pub config: Arc<Config>,
    /// Cliente do servidor Ollama.
    pub ollama: Arc<OllamaClient>,
    /// Workspace atual (None até o primeiro upload).
    pub workspace: Arc<Mutex<Option<Workspace>>>,
    /// Canal broadcast para eventos SSE de análise.
    pub events_tx: Arc<broadcast::Sender<AnalysisEvent>>,
}

impl AppState {
    /// Monta o estado a partir da configuração.
    ///
    /// Capacidade de 256 eventos — mensagens antigas são descartadas se o
    /// consumidor for lento.
    pub fn new(config: Config) -> Result<Self> {
        let ollama = OllamaClient::new(config.ollama_url.clone(), config.chat_timeout)
            .context("Falha ao criar cliente HTTP do Ollama")?;
        let (events_tx, _) = broadcast::channel::<AnalysisEvent>(256);
        Ok(Self {
            config: Arc::new(config),
            ollama: Arc::new(ollama),
            workspace: Arc::new(Mutex::new(None)),
            events_tx: Arc::new(events_tx),
        })
    }

    /// Cópia do workspace atual.
    pub fn snapshot(&self) -> Option<Workspace> {
        self.workspace.lock().clone()
    }
}
