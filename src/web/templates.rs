//! # Templates Maud — HTML Server-Side Rendering
//!
//! Templates HTML renderizados em tempo de compilação com o macro
//! [`maud`](https://maud.lambda.xyz/). O servidor devolve fragmentos
//! HTML que o HTMX injeta no DOM.
//!
//! ## Templates Disponíveis
//!
//! | Função | Tipo | Descrição |
//! |--------|------|-----------|
//! | [`full_page()`] | Página completa | Upload + sidebar + resultados |
//! | [`results()`] | Fragment HTMX | Abas: gráfico, tabela, JSON, chat |
//! | [`chat_history()`] | Fragment HTMX | Mensagens do chat |
//! | [`connection_result()`] | Fragment HTMX | Resultado do teste de conexão |
//!
//! ## Layout Principal (`full_page`)
//!
//! ```text
//! ┌──────────────── header ─────────────────────────────┐
//! │ 📊 Word Frequency Analysis with AI Agent             │
//! ├──────────── sidebar ─┬──────────────────────────────┤
//! │ ⚙️ Configuração      │ 📁 Upload  [arquivo] [top-N] │
//! │  Modelo Ollama [▾]   │ ℹ️ Sobre                      │
//! │  [Testar conexão]    ├──────────────────────────────┤
//! │  Atividade (SSE)     │ 📈 Resultados                 │
//! │                      │  [Gráfico|Tabela|JSON|Chat]   │
//! └──────────────────────┴──────────────────────────────┘
//! ```

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::analysis::AnalysisOutcome;
use crate::chat::{ChatError, ChatSession, MessageRole};
use crate::config::{Config, TOP_N_RANGE};
use crate::core::FrequencyTable;
use crate::web::state::Workspace;

/// Quantas barras o gráfico mostra, no máximo.
const CHART_MAX_BARS: usize = 20;

/// Página principal — sidebar de configuração, upload e resultados.
///
/// Se já existe um workspace (página recarregada depois de um upload),
/// os resultados são renderizados direto, sem novo upload.
pub fn full_page(config: &Config, workspace: Option<&Workspace>) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Word Frequency Analysis with AI Agent" }
                link rel="stylesheet" href="/assets/style.css";
                script src="https://unpkg.com/htmx.org@2.0.4/dist/htmx.min.js" {}
            }
            body {
                div class="app-shell" {
                    h1 class="main-header" { "📊 Word Frequency Analysis with AI Agent" }

                    div class="app-container" {
                        // Sidebar (esquerda)
                        aside class="sidebar" {
                            h2 { "⚙️ Configuração" }

                            label for="model-select" { "Modelo Ollama" }
                            select id="model-select" name="model" {
                                @for model in &config.models {
                                    option value=(model) { (model) }
                                }
                            }
                            p class="hint" {
                                "Verifique se o modelo está instalado no seu Ollama ("
                                code { (config.ollama_url) } ")."
                            }

                            button class="btn"
                                hx-post="/ollama/test"
                                hx-include="#model-select"
                                hx-target="#ollama-status"
                                hx-swap="innerHTML" {
                                "Testar conexão com o Ollama"
                            }
                            div id="ollama-status" {}

                            h2 { "Atividade" }
                            div id="activity-log" class="activity-log" {
                                div class="log-empty" { "Aguardando análises..." }
                            }
                        }

                        // Conteúdo principal (direita)
                        main class="main-panel" {
                            div class="columns" {
                                section class="upload-section" {
                                    h2 class="section-header" { "📁 Enviar documento" }
                                    form id="upload-form"
                                        hx-post="/upload"
                                        hx-encoding="multipart/form-data"
                                        hx-target="#results"
                                        hx-swap="innerHTML"
                                        hx-indicator="#upload-spinner" {
                                        input type="file" name="document" accept=".pdf,.docx,.txt" required;
                                        label for="top-n" {
                                            "Número de palavras no ranking: "
                                            output id="top-n-value" { (config.default_top_n) }
                                        }
                                        input type="range" id="top-n" name="top_n"
                                            min=(*TOP_N_RANGE.start()) max=(*TOP_N_RANGE.end())
                                            value=(config.default_top_n)
                                            oninput="document.getElementById('top-n-value').value=this.value";
                                        button type="submit" class="btn primary" { "Analisar" }
                                        span id="upload-spinner" class="htmx-indicator" { "Analisando documento..." }
                                    }
                                }

                                section class="about-section" {
                                    h2 class="section-header" { "ℹ️ Sobre" }
                                    div class="info-box" {
                                        p {
                                            "Analisa a frequência de palavras do seu documento e oferece "
                                            "um chat com IA para discutir os resultados."
                                        }
                                        ul {
                                            li { "Extração de texto de PDF, DOCX e TXT" }
                                            li { "Ranking de frequência de palavras" }
                                            li { "Gráfico, tabela e JSON" }
                                            li { "Chat com IA via Ollama" }
                                        }
                                    }
                                }
                            }

                            div id="results" {
                                @if let Some(ws) = workspace {
                                    (results(ws, config))
                                } @else {
                                    (welcome())
                                }
                            }
                        }
                    }

                    footer { "Feito com Axum + HTMX e movido a Ollama" }
                }

                (PreEscaped(r#"<script>
function switchTab(name) {
  document.querySelectorAll('.tab-button').forEach(function(b) {
    b.classList.toggle('active', b.dataset.tab === name);
  });
  document.querySelectorAll('.tab-panel').forEach(function(p) {
    p.classList.toggle('active', p.id === 'tab-' + name);
  });
}

// SSE: feed de atividade das análises
(function() {
  var log = document.getElementById('activity-log');
  var es = new EventSource('/events');
  es.onmessage = function(e) {
    try {
      var ev = JSON.parse(e.data);
      var line = null;
      if (ev.type === 'Started') line = '▶ ' + ev.filename + ' (' + ev.size_bytes + ' bytes, top ' + ev.top_n + ')';
      if (ev.type === 'TextExtracted') line = '📄 ' + ev.text_len + ' chars extraídos em ' + ev.extract_ms + 'ms';
      if (ev.type === 'Completed') line = '✅ ' + ev.entries + ' palavras' + (ev.top_word ? ' — topo: ' + ev.top_word : '') + ' (' + ev.total_ms + 'ms)';
      if (ev.type === 'Error') line = '❌ ' + ev.message;
      if (!line || !log) return;
      var empty = log.querySelector('.log-empty');
      if (empty) empty.remove();
      var div = document.createElement('div');
      div.className = 'log-line' + (ev.type === 'Error' ? ' error' : '');
      div.textContent = line;
      log.prepend(div);
    } catch(err) {}
  };
})();
</script>"#))
            }
        }
    }
}

/// Mensagem de boas-vindas exibida antes do primeiro upload.
fn welcome() -> Markup {
    html! {
        div class="welcome" {
            h3 { "Bem-vindo à análise de frequência de palavras!" }
            p { strong { "Para começar:" } }
            ol {
                li { "Envie um arquivo PDF, DOCX ou TXT no formulário acima" }
                li { "Ajuste o número de palavras do ranking com o slider" }
                li { "Veja os resultados em gráfico, tabela ou JSON" }
                li { "Converse com o assistente de IA sobre o documento" }
            }
        }
    }
}

/// Caixa de erro genérica.
pub fn error_box(message: &str) -> Markup {
    html! {
        div class="message error-message" { (message) }
    }
}

/// Resultados de um workspace: cabeçalho do arquivo + abas.
///
/// Se a análise falhou, só a caixa de erro é exibida (sem abas).
pub fn results(ws: &Workspace, config: &Config) -> Markup {
    html! {
        h2 class="section-header" { "📈 Resultados da análise" }
        div class="info-box" {
            strong { "Arquivo: " } (ws.filename)
            " | " strong { "Tamanho: " } (format_bytes(ws.size_bytes))
            " | " strong { "Top-N: " } (ws.top_n)
        }
        @match &ws.outcome {
            AnalysisOutcome::Error { message } => {
                (error_box(&format!("A análise falhou: {}", message)))
            }
            AnalysisOutcome::Ok { entries } => {
                div class="tabs" {
                    button class="tab-button active" data-tab="chart" onclick="switchTab('chart')" { "📊 Gráfico" }
                    button class="tab-button" data-tab="table" onclick="switchTab('table')" { "📋 Tabela" }
                    button class="tab-button" data-tab="json" onclick="switchTab('json')" { "📄 JSON" }
                    button class="tab-button" data-tab="chat" onclick="switchTab('chat')" { "💬 Chat IA" }
                }
                div id="tab-chart" class="tab-panel active" { (frequency_chart(entries)) }
                div id="tab-table" class="tab-panel" { (frequency_table(entries)) }
                div id="tab-json" class="tab-panel" { (json_view(&ws.outcome)) }
                div id="tab-chat" class="tab-panel" { (chat_panel(&ws.chat, config)) }
            }
        }
    }
}

/// Gráfico de barras horizontais com até 20 palavras.
///
/// A largura de cada barra é proporcional à maior contagem da tabela.
pub fn frequency_chart(table: &FrequencyTable) -> Markup {
    let max = table.max_count().max(1);
    html! {
        @if table.is_empty() {
            (error_box("Nenhuma palavra sobreviveu aos filtros — não há o que plotar."))
        } @else {
            h3 { "Top " (table.len().min(CHART_MAX_BARS)) " palavras mais frequentes" }
            div class="chart" {
                @for entry in table.iter().take(CHART_MAX_BARS) {
                    div class="chart-row" title=(format!("{}: {}", entry.word, entry.count)) {
                        span class="chart-label" { (entry.word) }
                        span class="chart-bar" {
                            span class="chart-fill"
                                style=(format!("width: {}%", entry.count * 100 / max)) {}
                        }
                        span class="chart-count" { (entry.count) }
                    }
                }
            }
        }
    }
}

/// Tabela com colunas rank (1-based), palavra e contagem.
pub fn frequency_table(table: &FrequencyTable) -> Markup {
    html! {
        @if table.is_empty() {
            (error_box("Nenhum dado disponível para a tabela."))
        } @else {
            table class="freq-table" {
                thead {
                    tr { th { "rank" } th { "word" } th { "count" } }
                }
                tbody {
                    @for (i, entry) in table.iter().enumerate() {
                        tr {
                            td { (i + 1) }
                            td { (entry.word) }
                            td { (entry.count) }
                        }
                    }
                }
            }
        }
    }
}

/// JSON bruto do resultado, pretty-printed.
pub fn json_view(outcome: &AnalysisOutcome) -> Markup {
    let json = serde_json::to_string_pretty(outcome).unwrap_or_default();
    html! {
        pre class="json-view" { code { (json) } }
    }
}

/// Aba de chat: histórico + formulário + botão de limpar.
pub fn chat_panel(session: &ChatSession, config: &Config) -> Markup {
    html! {
        p { "Pergunte sobre a análise ou sobre o documento. Modelo padrão: " code { (config.default_model()) } }
        div id="chat-history" class="chat-history" {
            (chat_history(session))
        }
        form id="chat-form"
            hx-post="/chat"
            hx-include="#model-select"
            hx-target="#chat-history"
            hx-swap="innerHTML"
            hx-indicator="#chat-spinner"
            hx-on-after-request="this.reset()" {
            input type="text" name="message" placeholder="Digite sua pergunta..." autocomplete="off";
            button type="submit" class="btn primary" { "Enviar" }
            span id="chat-spinner" class="htmx-indicator" { "A IA está pensando..." }
        }
        button class="btn"
            hx-post="/chat/clear"
            hx-target="#chat-history"
            hx-swap="innerHTML" {
            "Limpar chat"
        }
    }
}

/// Mensagens do histórico, na ordem em que entraram.
pub fn chat_history(session: &ChatSession) -> Markup {
    html! {
        @if session.is_empty() {
            div class="chat-empty" { "Nenhuma mensagem ainda." }
        }
        @for msg in session.messages() {
            div class=(format!("message chat-message {}", msg.role.css_class())) {
                strong { (msg.role.label()) ": " }
                (msg.content)
                span class="message-time" { (msg.at.format("%H:%M:%S").to_string()) }
            }
        }
    }
}

/// Resultado do teste de conexão com o Ollama.
pub fn connection_result(result: &Result<String, ChatError>) -> Markup {
    html! {
        @match result {
            Ok(_) => {
                div class="message success-message" { "Conexão com o Ollama bem-sucedida!" }
            }
            Err(e) => {
                (error_box(&e.to_string()))
            }
        }
    }
}

/// Formata bytes com separador de milhar (ex: `12,345 bytes`).
fn format_bytes(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("{} bytes", out)
}

// ─── Extensões de MessageRole para HTML ──────────────────────────

impl MessageRole {
    /// Classe CSS da mensagem no histórico.
    pub fn css_class(&self) -> &'static str {
        match self {
            MessageRole::User => "user-message",
            MessageRole::Assistant => "ai-message",
            MessageRole::Error => "error-message",
        }
    }

    /// Label textual da role para exibição no chat.
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "Você",
            MessageRole::Assistant => "IA",
            MessageRole::Error => "Erro",
        }
    }
}
