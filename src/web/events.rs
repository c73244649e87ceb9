//! # Eventos SSE de Análise
//!
//! Define o enum [`AnalysisEvent`] — os marcos de cada análise de
//! documento, enviados ao frontend via Server-Sent Events para o feed
//! de atividade da sidebar.
//!
//! ## Ciclo de Vida dos Eventos
//!
//! ```text
//! Started → TextExtracted → Completed
//!        └──────────────────→ Error
//! ```
//!
//! ## Serialização
//!
//! Usa `#[serde(tag = "type")]` para produzir JSON com discriminador:
//!
//! ```json
//! { "type": "Completed", "analysis_id": "uuid", "entries": 20, "top_word": "fox", "total_ms": 12 }
//! ```

use serde::Serialize;
use uuid::Uuid;

/// Evento emitido durante uma análise, enviado via SSE ao frontend.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum AnalysisEvent {
    /// Upload recebido, análise iniciada.
    Started {
        analysis_id: Uuid,
        /// Nome do arquivo enviado.
        filename: String,
        /// Tamanho do upload em bytes.
        size_bytes: usize,
        /// Top-N pedido (já limitado a 5–100).
        top_n: usize,
    },

    /// Texto extraído do documento.
    TextExtracted {
        analysis_id: Uuid,
        /// Comprimento do texto extraído (em bytes).
        text_len: usize,
        /// Tempo de extração (ms).
        extract_ms: u64,
    },

    /// Ranking pronto.
    Completed {
        analysis_id: Uuid,
        /// Número de entradas na tabela.
        entries: usize,
        /// Palavra mais frequente, se houver.
        top_word: Option<String>,
        /// Tempo total da análise (ms).
        total_ms: u64,
    },

    /// Falha em qualquer fase (formato, extração, texto vazio, timeout).
    Error {
        analysis_id: Uuid,
        /// Mensagem de erro legível.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_serialization() {
        let id = Uuid::nil();
        let ev = AnalysisEvent::Error {
            analysis_id: id,
            message: "Nenhum texto encontrado no documento".into(),
        };
        let v: serde_json::Value = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["type"], "Error");
        assert_eq!(v["analysis_id"], id.to_string());
        assert_eq!(v["message"], "Nenhum texto encontrado no documento");
    }
}
