//! # Pipeline de Análise — Do Upload à Tabela de Frequências
//!
//! Compõe o extrator e o ranker em uma chamada in-process. É aqui que
//! as falhas internas viram o resultado etiquetado [`AnalysisOutcome`],
//! para que a camada de apresentação (gráfico, tabela, JSON, CLI) só
//! precise verificar um marcador.
//!
//! ## Pipeline
//!
//! ```text
//! (filename, bytes, top_n)
//!   ├── 1. Resolver formato pela extensão  → UnsupportedFormat
//!   ├── 2. Extrair texto → extract::extract → Extraction
//!   ├── 3. Texto vazio/só espaços?          → EmptyText
//!   ├── 4. Ranquear → ranker::rank
//!   └── 5. AnalysisOutcome::Ok | AnalysisOutcome::Error
//! ```
//!
//! ## Formato de Saída
//!
//! | Variante | JSON |
//! |----------|------|
//! | `Ok` | `{"status":"ok","entries":[{"word":"fox","count":5}]}` |
//! | `Error` | `{"status":"error","message":"..."}` |
//!
//! O formato antigo (lista com um único `{"error": ...}`) continua
//! disponível via [`AnalysisOutcome::to_legacy_json()`].

use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::core::{AnalysisError, Document, FrequencyTable};
use crate::web::events::AnalysisEvent;
use crate::{extract, ranker};

/// Top-N padrão quando o chamador não informa.
pub const DEFAULT_TOP_N: usize = 20;

/// Resultado etiquetado de uma análise: tabela ou mensagem de erro.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisOutcome {
    /// Análise concluída.
    Ok { entries: FrequencyTable },
    /// Análise falhou; `message` é legível por humanos.
    Error { message: String },
}

impl AnalysisOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, AnalysisOutcome::Error { .. })
    }

    /// Tabela, se a análise teve sucesso.
    pub fn table(&self) -> Option<&FrequencyTable> {
        match self {
            AnalysisOutcome::Ok { entries } => Some(entries),
            AnalysisOutcome::Error { .. } => None,
        }
    }

    /// Formato antigo de fio: a tabela pura, ou `[{"error": "..."}]`.
    pub fn to_legacy_json(&self) -> serde_json::Value {
        match self {
            AnalysisOutcome::Ok { entries } => json!(entries),
            AnalysisOutcome::Error { message } => json!([{ "error": message }]),
        }
    }
}

impl From<Result<FrequencyTable, AnalysisError>> for AnalysisOutcome {
    fn from(result: Result<FrequencyTable, AnalysisError>) -> Self {
        match result {
            Ok(entries) => AnalysisOutcome::Ok { entries },
            Err(e) => AnalysisOutcome::Error {
                message: e.to_string(),
            },
        }
    }
}

/// Extrai e ranqueia um documento.
///
/// # Erros
///
/// - [`AnalysisError::Extraction`] — falha do parser
/// - [`AnalysisError::EmptyText`] — texto extraído vazio ou só espaços
pub fn analyze(document: &Document<'_>, top_n: usize) -> Result<FrequencyTable, AnalysisError> {
    analyze_with(document, top_n, |_, _| {})
}

/// Como [`analyze()`], chamando `on_extracted(texto, extract_ms)` entre as fases.
fn analyze_with(
    document: &Document<'_>,
    top_n: usize,
    on_extracted: impl FnOnce(&str, u64),
) -> Result<FrequencyTable, AnalysisError> {
    // ─── Fase 1: Extração de texto ───────────────────────────────
    let t_extract = Instant::now();
    let text = extract::extract(document)?;
    on_extracted(&text, t_extract.elapsed().as_millis() as u64);

    // ─── Fase 2: Ranking ─────────────────────────────────────────
    ranker::rank(&text, top_n)
}

/// Fronteira externa sem eventos (usada pela CLI e pela API JSON).
pub fn analyze_file(filename: &str, bytes: &[u8], top_n: usize) -> AnalysisOutcome {
    run(Uuid::new_v4(), filename, bytes, top_n, |_| {})
}

/// Fronteira externa da UI: mesma análise, emitindo [`AnalysisEvent`]s no canal SSE.
///
/// Erros de envio (nenhum assinante conectado) são ignorados.
pub fn analyze_upload(
    analysis_id: Uuid,
    filename: &str,
    bytes: &[u8],
    top_n: usize,
    tx: &broadcast::Sender<AnalysisEvent>,
) -> AnalysisOutcome {
    run(analysis_id, filename, bytes, top_n, |ev| {
        let _ = tx.send(ev);
    })
}

fn run(
    analysis_id: Uuid,
    filename: &str,
    bytes: &[u8],
    top_n: usize,
    emit: impl Fn(AnalysisEvent),
) -> AnalysisOutcome {
    let span = tracing::info_span!("analysis", %analysis_id, filename);
    let _guard = span.enter();

    let t_total = Instant::now();
    emit(AnalysisEvent::Started {
        analysis_id,
        filename: filename.to_string(),
        size_bytes: bytes.len(),
        top_n,
    });

    let result = Document::from_filename(filename, bytes).and_then(|document| {
        analyze_with(&document, top_n, |text, extract_ms| {
            tracing::info!(
                format = %document.format,
                text_len = text.len(),
                extract_ms,
                "Texto extraído"
            );
            emit(AnalysisEvent::TextExtracted {
                analysis_id,
                text_len: text.len(),
                extract_ms,
            });
        })
    });

    let total_ms = t_total.elapsed().as_millis() as u64;
    match &result {
        Ok(table) => {
            tracing::info!(entries = table.len(), total_ms, "Análise completa");
            emit(AnalysisEvent::Completed {
                analysis_id,
                entries: table.len(),
                top_word: table.entries().first().map(|e| e.word.clone()),
                total_ms,
            });
        }
        Err(e) => {
            tracing::warn!(error = %e, total_ms, "Análise falhou");
            emit(AnalysisEvent::Error {
                analysis_id,
                message: e.to_string(),
            });
        }
    }

    result.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DocumentFormat;

    #[test]
    fn plain_text_end_to_end() {
        let outcome = analyze_file("notas.txt", b"The Fox jumps. The FOX runs!", 5);
        let table = outcome.table().expect("expected a table");
        assert_eq!(table.entries()[0].word, "fox");
        assert_eq!(table.entries()[0].count, 2);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn whitespace_document_is_empty_text() {
        let doc = Document::new(b"   \n\n  ", DocumentFormat::Text);
        assert_eq!(analyze(&doc, 20).unwrap_err(), AnalysisError::EmptyText);
    }

    #[test]
    fn unsupported_format_becomes_error_outcome() {
        let outcome = analyze_file("planilha.xlsx", b"irrelevante", 20);
        match outcome {
            AnalysisOutcome::Error { message } => assert!(message.contains("xlsx")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn tagged_json_shapes() {
        let ok = analyze_file("a.txt", b"alpha alpha beta", 5);
        let v = serde_json::to_value(&ok).unwrap();
        assert_eq!(v["status"], "ok");
        assert_eq!(v["entries"][0]["word"], "alpha");
        assert_eq!(v["entries"][0]["count"], 2);

        let err = analyze_file("a.txt", b"  ", 5);
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["message"], "Nenhum texto encontrado no documento");
    }

    #[test]
    fn legacy_json_shapes() {
        let ok = analyze_file("a.txt", b"alpha alpha beta", 5);
        assert_eq!(
            ok.to_legacy_json(),
            json!([{ "word": "alpha", "count": 2 }, { "word": "beta", "count": 1 }])
        );

        let err = analyze_file("a.doc", b"x", 5);
        let legacy = err.to_legacy_json();
        assert_eq!(legacy.as_array().map(Vec::len), Some(1));
        assert!(legacy[0]["error"].as_str().unwrap().contains("doc"));
    }

    #[test]
    fn all_stopwords_is_empty_table_not_error() {
        let outcome = analyze_file("a.txt", b"a an it is ok go", 10);
        assert_eq!(
            outcome,
            AnalysisOutcome::Ok {
                entries: FrequencyTable::default()
            }
        );
    }

    /// Eventos emitidos em ordem: Started → TextExtracted → Completed
    #[test]
    fn upload_emits_lifecycle_events() {
        let (tx, mut rx) = broadcast::channel(16);
        let id = Uuid::new_v4();
        let outcome = analyze_upload(id, "a.txt", b"gamma gamma delta", 10, &tx);
        assert!(!outcome.is_error());

        assert!(matches!(rx.try_recv().unwrap(), AnalysisEvent::Started { top_n: 10, .. }));
        assert!(matches!(rx.try_recv().unwrap(), AnalysisEvent::TextExtracted { .. }));
        match rx.try_recv().unwrap() {
            AnalysisEvent::Completed {
                analysis_id,
                entries,
                top_word,
                ..
            } => {
                assert_eq!(analysis_id, id);
                assert_eq!(entries, 2);
                assert_eq!(top_word.as_deref(), Some("gamma"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn upload_failure_emits_error_event() {
        let (tx, mut rx) = broadcast::channel(16);
        let outcome = analyze_upload(Uuid::new_v4(), "x.xlsx", b"", 10, &tx);
        assert!(outcome.is_error());
        assert!(matches!(rx.try_recv().unwrap(), AnalysisEvent::Started { .. }));
        assert!(matches!(rx.try_recv().unwrap(), AnalysisEvent::Error { .. }));
    }
}
