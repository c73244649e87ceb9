//! # Módulo Web — Interface de Análise e Chat
//!
//! Este módulo organiza toda a camada web da aplicação, construída
//! com **Axum** + **HTMX** + **Maud** + **SSE**.
//!
//! ## Arquitetura Web
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Browser (HTMX + SSE)                                    │
//! ├─────────────────────────────────────────────────────────┤
//! │ Axum Router (este módulo)                               │
//! │  ├── GET  /               → página principal            │
//! │  ├── POST /upload         → HTMX fragment (resultados)  │
//! │  ├── POST /api/analyze    → JSON (AnalysisOutcome)      │
//! │  ├── GET  /analysis.json  → JSON do workspace atual     │
//! │  ├── POST /chat           → HTMX fragment (histórico)   │
//! │  ├── POST /chat/clear     → HTMX fragment               │
//! │  ├── POST /ollama/test    → HTMX fragment               │
//! │  └── GET  /events         → SSE stream (análises)       │
//! ├─────────────────────────────────────────────────────────┤
//! │ Static Assets (tower_http::ServeDir → /assets/)         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submódulos
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`state`] | Estado compartilhado (`AppState`, `Workspace`) |
//! | [`events`] | Enum de eventos SSE de análise |
//! | [`handlers`] | Handlers Axum para cada rota |
//! | [`templates`] | Templates Maud (HTML server-side) |

pub mod events;
pub mod handlers;
pub mod state;
pub mod templates;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use state::AppState;

/// Cria o router Axum com todas as rotas da aplicação.
///
/// As rotas de upload aceitam corpos até `config.max_upload_bytes`;
/// acima disso o Axum responde 413.
pub fn create_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        // ── Páginas HTML ──────────────────────────────────────
        .route("/", get(handlers::index))
        // ── Análise ───────────────────────────────────────────
        .route("/upload", post(handlers::upload).layer(upload_limit.clone()))
        .route("/api/analyze", post(handlers::api_analyze).layer(upload_limit))
        .route("/analysis.json", get(handlers::analysis_json))
        .route("/events", get(handlers::sse_events))
        // ── Chat ──────────────────────────────────────────────
        .route("/chat", post(handlers::chat))
        .route("/chat/clear", post(handlers::clear_chat))
        .route("/ollama/test", post(handlers::ollama_test))
        // ── Arquivos estáticos ────────────────────────────────
        .nest_service("/assets", ServeDir::new("assets"))
        .fallback(handlers::not_found)
        .with_state(state)
}
