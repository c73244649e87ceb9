//! # Handlers HTTP — Os Endpoints da Aplicação
//!
//! Cada função pública neste módulo é um handler Axum, mapeado a uma
//! rota em [`super::create_router()`]. Os handlers da UI seguem o padrão
//! **HTMX fragment** — retornam fragmentos HTML que o HTMX injeta no DOM.
//!
//! ## Padrão de Resposta
//!
//! | Handler | Método | Retorno | Uso |
//! |---------|--------|---------|-----|
//! | `index` | GET | HTML completo | Página principal |
//! | `upload` | POST | HTMX fragment | Resultados da análise |
//! | `api_analyze` | POST | JSON | Análise sem UI |
//! | `analysis_json` | GET | JSON | Resultado do workspace atual |
//! | `chat` | POST | HTMX fragment | Histórico do chat |
//! | `clear_chat` | POST | HTMX fragment | Histórico vazio |
//! | `ollama_test` | POST | HTMX fragment | Teste de conexão |
//! | `sse_events` | GET | SSE stream | Eventos de análise |
//!
//! ## Orçamento de Tempo
//!
//! A análise é CPU-bound e síncrona: roda em `spawn_blocking`, envolta
//! em `tokio::time::timeout` com o limite da configuração. Estouro de
//! tempo ou pânico no parser viram um [`AnalysisOutcome::Error`].

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::Html;
use axum::{Form, Json};
use futures_util::stream::StreamExt;
use maud::html;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use super::events::AnalysisEvent;
use super::state::{AppState, Workspace};
use super::templates;
use crate::analysis::{self, AnalysisOutcome};
use crate::chat::{self, ChatSession};
use crate::config::clamp_top_n;

/// Converte Maud Markup em resposta Html<String> do Axum.
fn markup_to_html(m: maud::Markup) -> Html<String> {
    Html(m.into_string())
}

/// Arquivo recebido via multipart + top-N pedido.
struct Upload {
    filename: String,
    bytes: Vec<u8>,
    top_n: usize,
}

/// Falha ao ler o multipart, com o status HTTP correspondente.
///
/// Corpo acima do limite vira 413; o resto, 400.
struct UploadError {
    status: StatusCode,
    message: String,
}

impl UploadError {
    fn multipart(e: MultipartError) -> Self {
        let status = e.status();
        let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "Arquivo excede o tamanho máximo de upload.".to_string()
        } else {
            format!("Erro no upload: {}", e)
        };
        Self { status, message }
    }
}

/// Lê os campos `document` e `top_n` do multipart, em qualquer ordem.
///
/// `top_n` ausente ou inválido cai no padrão da configuração; o valor
/// final é limitado ao intervalo do slider.
async fn read_upload(
    multipart: &mut Multipart,
    default_top_n: usize,
) -> Result<Upload, UploadError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut top_n = default_top_n;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(UploadError::multipart(e)),
        };
        match field.name().unwrap_or("") {
            "document" => {
                let filename = field.file_name().unwrap_or("documento.txt").to_string();
                let bytes = field.bytes().await.map_err(UploadError::multipart)?;
                file = Some((filename, bytes.to_vec()));
            }
            "top_n" => {
                let raw = field.text().await.map_err(UploadError::multipart)?;
                top_n = raw.trim().parse().unwrap_or(default_top_n);
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| UploadError {
        status: StatusCode::BAD_REQUEST,
        message: "Nenhum arquivo encontrado no upload.".into(),
    })?;
    Ok(Upload {
        filename,
        bytes,
        top_n: clamp_top_n(top_n),
    })
}

/// Roda a análise fora do executor async, com orçamento de tempo.
///
/// Estouro de tempo ou falha da task também emitem
/// [`AnalysisEvent::Error`], já que a task não chegou a reportar o fim.
/// A task abandonada continua rodando (`spawn_blocking` não é
/// cancelável); seus eventos atrasados têm o mesmo `analysis_id`.
async fn run_analysis(state: &AppState, analysis_id: Uuid, upload: &Upload) -> AnalysisOutcome {
    let tx = state.events_tx.clone();
    let filename = upload.filename.clone();
    let bytes = upload.bytes.clone();
    let top_n = upload.top_n;

    let task = tokio::task::spawn_blocking(move || {
        analysis::analyze_upload(analysis_id, &filename, &bytes, top_n, &tx)
    });

    let message = match tokio::time::timeout(state.config.analysis_timeout, task).await {
        Ok(Ok(outcome)) => return outcome,
        Ok(Err(e)) => {
            tracing::error!(error = %e, %analysis_id, "Task de análise falhou");
            format!("Erro interno ao processar o arquivo: {}", e)
        }
        Err(_) => {
            tracing::warn!(
                %analysis_id,
                timeout_ms = state.config.analysis_timeout.as_millis() as u64,
                "Análise excedeu o tempo limite"
            );
            "A análise excedeu o tempo limite. Tente um documento menor.".to_string()
        }
    };

    let _ = state.events_tx.send(AnalysisEvent::Error {
        analysis_id,
        message: message.clone(),
    });
    AnalysisOutcome::Error { message }
}

/// GET `/` — Página principal.
///
/// Renderiza os resultados do workspace atual, se houver.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let ws = state.snapshot();
    markup_to_html(templates::full_page(&state.config, ws.as_ref()))
}

/// POST `/upload` — Recebe um documento, analisa e substitui o workspace.
///
/// ## Fluxo
///
/// ```text
/// 1. Lê campos "document" e "top_n" do multipart
/// 2. Roda extract + rank em spawn_blocking (com timeout)
/// 3. Substitui o workspace (chat recomeça vazio)
/// 4. Renderiza o fragmento de resultados
/// ```
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Html<String>) {
    let upload = match read_upload(&mut multipart, state.config.default_top_n).await {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!(message = %e.message, status = %e.status, "Upload inválido");
            return (e.status, markup_to_html(templates::error_box(&e.message)));
        }
    };

    let analysis_id = Uuid::new_v4();
    tracing::info!(
        %analysis_id,
        filename = %upload.filename,
        size_bytes = upload.bytes.len(),
        top_n = upload.top_n,
        "Upload recebido"
    );

    let outcome = run_analysis(&state, analysis_id, &upload).await;

    let ws = Workspace {
        analysis_id,
        filename: upload.filename,
        size_bytes: upload.bytes.len(),
        top_n: upload.top_n,
        outcome,
        chat: ChatSession::new(),
    };
    let markup = templates::results(&ws, &state.config);
    *state.workspace.lock() = Some(ws);

    (StatusCode::OK, markup_to_html(markup))
}

/// POST `/api/analyze` — Mesma análise do upload, resposta em JSON.
///
/// Não altera o workspace da UI.
/// Erros de análise voltam com 200 e `status: "error"`; só falhas do
/// multipart (400/413) mudam o status HTTP.
pub async fn api_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<AnalysisOutcome>) {
    match read_upload(&mut multipart, state.config.default_top_n).await {
        Ok(upload) => {
            let outcome = run_analysis(&state, Uuid::new_v4(), &upload).await;
            (StatusCode::OK, Json(outcome))
        }
        Err(e) => (e.status, Json(AnalysisOutcome::Error { message: e.message })),
    }
}

/// GET `/analysis.json` — Resultado do workspace atual.
pub async fn analysis_json(State(state): State<AppState>) -> Json<AnalysisOutcome> {
    let outcome = state
        .workspace
        .lock()
        .as_ref()
        .map(|ws| ws.outcome.clone())
        .unwrap_or_else(|| AnalysisOutcome::Error {
            message: "Nenhum documento analisado ainda.".into(),
        });
    Json(outcome)
}

/// Dados do formulário de chat.
#[derive(serde::Deserialize)]
pub struct ChatForm {
    /// Pergunta do usuário.
    pub message: String,
    /// Modelo escolhido no seletor da sidebar.
    pub model: Option<String>,
}

/// POST `/chat` — Executa um turno de chat sobre o documento atual.
///
/// ## Fluxo
///
/// ```text
/// 1. Copia sessão + contexto do workspace (lock curto)
/// 2. chat_turn(sessão, pergunta) → nova sessão   (sem lock)
/// 3. Grava a sessão de volta, se o workspace ainda é o mesmo
/// 4. Renderiza o histórico completo
/// ```
pub async fn chat(State(state): State<AppState>, Form(form): Form<ChatForm>) -> Html<String> {
    let Some(ws) = state.snapshot() else {
        return markup_to_html(templates::error_box("Envie um documento antes de usar o chat."));
    };
    let Some(context) = ws.chat_context() else {
        return markup_to_html(templates::error_box(
            "A análise falhou, não há resultados para discutir.",
        ));
    };

    let model = state.config.resolve_model(form.model.as_deref());
    let llm = state.ollama.as_ref();
    let session = chat::chat_turn(ws.chat, llm, model, &context, &form.message).await;

    let markup = templates::chat_history(&session);
    {
        let mut guard = state.workspace.lock();
        match guard.as_mut() {
            Some(current) if current.analysis_id == ws.analysis_id => current.chat = session,
            _ => tracing::info!("Workspace trocado durante o chat, histórico descartado"),
        }
    }
    markup_to_html(markup)
}

/// POST `/chat/clear` — Limpa o histórico do chat.
pub async fn clear_chat(State(state): State<AppState>) -> Html<String> {
    if let Some(ws) = state.workspace.lock().as_mut() {
        ws.chat = ChatSession::new();
    }
    tracing::info!("Chat limpo pelo usuário");
    markup_to_html(templates::chat_history(&ChatSession::new()))
}

/// Dados do formulário de teste de conexão.
#[derive(serde::Deserialize)]
pub struct ModelForm {
    pub model: Option<String>,
}

/// POST `/ollama/test` — Envia uma mensagem de teste ao modelo escolhido.
pub async fn ollama_test(
    State(state): State<AppState>,
    Form(form): Form<ModelForm>,
) -> Html<String> {
    let model = state.config.resolve_model(form.model.as_deref());
    let result = chat::test_connection(state.ollama.as_ref(), model).await;
    match &result {
        Ok(_) => tracing::info!(model, "Conexão com Ollama OK"),
        Err(e) => tracing::warn!(model, error = %e, "Teste de conexão falhou"),
    }
    markup_to_html(templates::connection_result(&result))
}

/// GET `/events` — Stream SSE de eventos de análise.
///
/// ## Keep-Alive
///
/// Envia keep-alive a cada 15s para manter a conexão viva
/// (proxies HTTP frequentemente fecham conexões idle).
///
/// ## Lagged Messages
///
/// Se o subscriber ficar para trás (buffer cheio), mensagens
/// são silenciosamente descartadas (filter_map retorna None).
pub async fn sse_events(
    State(state): State<AppState>,
) -> Sse<impl futures_util::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.events_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok(SseEvent::default().data(data)))
            }
            Err(_) => None, // mensagens atrasadas são descartadas
        }
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Fallback para rotas desconhecidas.
pub async fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        markup_to_html(html! {
            div class="message error-message" { "Página não encontrada." }
        }),
    )
}
