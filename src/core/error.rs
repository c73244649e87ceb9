//! Taxonomia de erros da análise.
//!
//! Os três erros são terminais para uma invocação — nenhum é repetido
//! internamente. Na fronteira mais externa eles viram um
//! [`AnalysisOutcome::Error`](crate::analysis::AnalysisOutcome) com a
//! mensagem de `Display`.

use thiserror::Error;

/// Falha ao extrair ou analisar um documento.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Extensão/tipo não reconhecido. Carrega a extensão rejeitada.
    #[error("Formato não suportado: '{0}'. Formatos suportados: PDF, DOCX, TXT")]
    UnsupportedFormat(String),

    /// Falha do parser ou do decodificador em um formato suportado.
    #[error("Erro ao extrair texto: {0}")]
    Extraction(String),

    /// Extração bem-sucedida, mas sem texto utilizável.
    #[error("Nenhum texto encontrado no documento")]
    EmptyText,
}
