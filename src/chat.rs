//! # Chat — Conversando Sobre a Análise
//!
//! O chat é uma sequência de turnos pergunta → resposta sobre a tabela
//! de frequências do documento atual, respondidos por um modelo de
//! linguagem local (Ollama).
//!
//! ## Sessão Explícita
//!
//! Não há histórico global: cada turno recebe a [`ChatSession`] atual e
//! devolve a sessão atualizada. Quem chama é dono da sessão.
//!
//! ```text
//! session ──chat_turn(question)──► session' = session + [User, Assistant]
//! ```
//!
//! ## Fronteira de Erros
//!
//! Falhas do serviço de modelo (conexão recusada, timeout, status ≠ 200)
//! nunca atravessam a fronteira como erro: viram texto simples na
//! resposta do assistente, com role [`MessageRole::Error`] para estilização.
//!
//! | Falha | Texto |
//! |-------|-------|
//! | conexão | `Error: Cannot connect to Ollama. ...` |
//! | timeout | `Error: Request to Ollama timed out.` |
//! | status | `Error: Ollama API returned status code 500` |
//! | outra | `Error querying Ollama: ...` |

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::FrequencyTable;

/// Mensagem enviada ao modelo no teste de conexão.
pub const CONNECTION_PROBE: &str = "Hello, are you working?";

/// Resposta usada quando o modelo devolve 200 sem o campo `response`.
const EMPTY_RESPONSE: &str = "No response received from AI.";

/// Instrução final anexada a todo prompt.
const PROMPT_SUFFIX: &str = "Please provide a helpful response about the word frequency analysis or answer questions about the document.";

/// Role de uma mensagem no histórico.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Pergunta do usuário.
    User,
    /// Resposta do modelo.
    Assistant,
    /// Falha do serviço de modelo, exibida no lugar da resposta.
    Error,
}

/// Uma mensagem do histórico.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    /// Momento em que a mensagem entrou no histórico.
    pub at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// Histórico ordenado de uma conversa, possuído por quem chama.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Devolve a sessão com a mensagem anexada ao final.
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }
}

/// Contexto da análise que acompanha cada pergunta.
#[derive(Clone, Debug)]
pub struct ChatContext {
    /// Nome do arquivo analisado.
    pub filename: String,
    /// Top-N usado na análise.
    pub top_n: usize,
    /// Tabela resultante.
    pub table: FrequencyTable,
}

/// Falhas do serviço de modelo. O `Display` é o texto mostrado ao usuário.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Error: Cannot connect to Ollama. Please make sure Ollama is running on {0}")]
    Connect(String),

    #[error("Error: Request to Ollama timed out.")]
    Timeout,

    #[error("Error: Ollama API returned status code {0}")]
    Status(u16),

    #[error("Error querying Ollama: {0}")]
    Other(String),
}

/// Serviço de modelo de linguagem: prompt + modelo → texto.
pub trait LanguageModel {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String, ChatError>> + Send;
}

// ─── Ollama ──────────────────────────────────────────────────────

/// Corpo de `POST /api/generate` (modo não-streaming).
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Resposta de `POST /api/generate`. Só o campo `response` interessa.
#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Cliente HTTP do servidor Ollama local.
#[derive(Clone, Debug)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    /// Cria o cliente com timeout total por requisição.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Other(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn classify(&self, e: reqwest::Error) -> ChatError {
        if e.is_timeout() {
            ChatError::Timeout
        } else if e.is_connect() {
            ChatError::Connect(self.base_url.clone())
        } else {
            ChatError::Other(e.to_string())
        }
    }
}

impl LanguageModel for OllamaClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ChatError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, model, "Ollama respondeu com erro");
            return Err(ChatError::Status(status.as_u16()));
        }

        let parsed: GenerateResponse = resp.json().await.map_err(|e| self.classify(e))?;
        Ok(parsed
            .response
            .unwrap_or_else(|| EMPTY_RESPONSE.to_string()))
    }
}

// ─── Turnos de conversa ──────────────────────────────────────────

/// Monta o prompt enviado ao modelo: contexto da análise + pergunta.
pub fn build_prompt(context: &ChatContext, question: &str) -> String {
    let table_json =
        serde_json::to_string_pretty(&context.table).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Document Analysis Results:\n\
         - File: {}\n\
         - Top {} most frequent words: {}\n\
         \n\
         User Question: {}\n\
         \n\
         {}",
        context.filename, context.top_n, table_json, question, PROMPT_SUFFIX
    )
}

/// Executa um turno: anexa a pergunta, consulta o modelo e anexa a resposta.
///
/// Nunca falha — erros do modelo entram no histórico como
/// [`MessageRole::Error`]. Perguntas vazias devolvem a sessão inalterada.
pub async fn chat_turn<L: LanguageModel>(
    session: ChatSession,
    llm: &L,
    model: &str,
    context: &ChatContext,
    question: &str,
) -> ChatSession {
    let question = question.trim();
    if question.is_empty() {
        return session;
    }

    let session = session.with_message(ChatMessage::new(MessageRole::User, question));
    let prompt = build_prompt(context, question);

    tracing::info!(model, prompt_len = prompt.len(), "Consultando modelo");
    let reply = match llm.generate(model, &prompt).await {
        Ok(text) => ChatMessage::new(MessageRole::Assistant, text),
        Err(e) => {
            tracing::warn!(error = %e, model, "Falha na consulta ao modelo");
            ChatMessage::new(MessageRole::Error, e.to_string())
        }
    };
    session.with_message(reply)
}

/// Testa a conexão enviando [`CONNECTION_PROBE`] ao modelo escolhido.
pub async fn test_connection<L: LanguageModel>(llm: &L, model: &str) -> Result<String, ChatError> {
    llm.generate(model, CONNECTION_PROBE).await
}
