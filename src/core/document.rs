//! # Document — Bytes Brutos + Formato Declarado
//!
//! Um [`Document`] existe apenas durante uma chamada de extração: carrega
//! os bytes enviados pelo usuário e o [`DocumentFormat`] que seleciona a
//! estratégia de extração. Nada é retido depois que o texto é produzido.
//!
//! ## Resolução de Formato
//!
//! | Extensão | Formato |
//! |----------|---------|
//! | `pdf` | [`DocumentFormat::Pdf`] |
//! | `docx` | [`DocumentFormat::Docx`] |
//! | `txt`, `text` | [`DocumentFormat::Text`] |
//! | qualquer outra | [`AnalysisError::UnsupportedFormat`] |
//!
//! A comparação é case-insensitive (`RELATORIO.PDF` é PDF).

use std::fmt;
use std::path::Path;

use super::error::AnalysisError;

/// Formato de documento suportado pelo extrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    /// PDF — texto de cada página, em ordem.
    Pdf,
    /// Microsoft Word (OOXML) — texto de cada parágrafo, em ordem.
    Docx,
    /// Texto puro em UTF-8.
    Text,
}

impl DocumentFormat {
    /// Resolve o formato a partir de uma extensão (sem o ponto).
    ///
    /// # Erros
    ///
    /// [`AnalysisError::UnsupportedFormat`] com a extensão em minúsculas
    /// quando ela não corresponde a nenhum formato conhecido.
    pub fn from_extension(ext: &str) -> Result<Self, AnalysisError> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "txt" | "text" => Ok(Self::Text),
            _ => Err(AnalysisError::UnsupportedFormat(ext)),
        }
    }

    /// Resolve o formato a partir de um nome de arquivo (ex: `"relatorio.pdf"`).
    ///
    /// Um nome sem extensão é rejeitado com extensão vazia.
    pub fn from_filename(name: &str) -> Result<Self, AnalysisError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(ext)
    }

    /// Extensão canônica, usada em logs e mensagens.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Text => "txt",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Documento efêmero: bytes emprestados + formato.
///
/// Os bytes são emprestados do chamador (upload multipart, arquivo lido
/// pela CLI) — o documento nunca copia nem guarda o conteúdo.
#[derive(Clone, Copy, Debug)]
pub struct Document<'a> {
    /// Conteúdo binário do arquivo.
    pub bytes: &'a [u8],
    /// Formato que seleciona a estratégia de extração.
    pub format: DocumentFormat,
}

impl<'a> Document<'a> {
    pub fn new(bytes: &'a [u8], format: DocumentFormat) -> Self {
        Self { bytes, format }
    }

    /// Cria um documento resolvendo o formato pelo nome do arquivo.
    pub fn from_filename(name: &str, bytes: &'a [u8]) -> Result<Self, AnalysisError> {
        Ok(Self::new(bytes, DocumentFormat::from_filename(name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(DocumentFormat::from_extension("pdf").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_extension("DOCX").unwrap(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_extension(".txt").unwrap(), DocumentFormat::Text);
    }

    /// Extensão desconhecida é rejeitada com o nome da extensão
    #[test]
    fn xlsx_is_unsupported() {
        let err = DocumentFormat::from_extension("xlsx").unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedFormat(ref ext) if ext == "xlsx"));
        assert!(err.to_string().contains("xlsx"));
    }

    #[test]
    fn filename_resolution() {
        assert_eq!(
            DocumentFormat::from_filename("Relatorio Anual.PDF").unwrap(),
            DocumentFormat::Pdf
        );
        let err = DocumentFormat::from_filename("planilha.xlsx").unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedFormat(ref ext) if ext == "xlsx"));
    }

    #[test]
    fn filename_without_extension() {
        let err = DocumentFormat::from_filename("LEIAME").unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedFormat(ref ext) if ext.is_empty()));
    }
}
