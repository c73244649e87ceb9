//! # Extração de Texto — Do Arquivo ao Texto Plano
//!
//! Dado um [`Document`] (bytes + formato), produz uma única string com o
//! texto do documento em ordem de origem. O parsing de cada formato é
//! delegado a bibliotecas existentes:
//!
//! | Formato | Biblioteca | Junção |
//! |---------|-----------|--------|
//! | PDF | `pdf_extract` (por página) | páginas unidas por `" "` |
//! | DOCX | `docx_rs` (por parágrafo) | parágrafos unidos por `" "` |
//! | Texto | `String::from_utf8` | verbatim |
//!
//! Nenhum objeto das bibliotecas sobrevive ao retorno — só o `String`.
//!
//! ## Erros
//!
//! Qualquer falha do parser (arquivo corrompido, UTF-8 inválido) vira
//! [`AnalysisError::Extraction`] com a causa original em texto.

use std::time::Instant;

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};

use crate::core::{AnalysisError, Document, DocumentFormat};

/// Extrai o texto de um documento conforme o seu formato.
pub fn extract(document: &Document<'_>) -> Result<String, AnalysisError> {
    let t0 = Instant::now();
    let text = match document.format {
        DocumentFormat::Pdf => extract_pdf(document.bytes)?,
        DocumentFormat::Docx => extract_docx(document.bytes)?,
        DocumentFormat::Text => extract_plain(document.bytes)?,
    };
    tracing::debug!(
        format = %document.format,
        size_bytes = document.bytes.len(),
        text_len = text.len(),
        extract_ms = t0.elapsed().as_millis() as u64,
        "Texto extraído"
    );
    Ok(text)
}

/// PDF: texto de cada página, em ordem, unido por espaços simples.
///
/// O `pdf_extract` entra em pânico com alguns PDFs malformados (fontes
/// sem `/Subtype`, Type0 sem `/DescendantFonts`, ...). O pânico é
/// contido aqui e vira [`AnalysisError::Extraction`] como qualquer
/// outra falha do parser.
fn extract_pdf(bytes: &[u8]) -> Result<String, AnalysisError> {
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|payload| {
            let cause = panic_message(payload.as_ref());
            tracing::warn!(%cause, "pdf_extract entrou em pânico");
            AnalysisError::Extraction(format!("PDF inválido: {}", cause))
        })?
        .map_err(|e| AnalysisError::Extraction(format!("PDF inválido: {}", e)))?;
    Ok(pages.join(" "))
}

/// Texto de um payload de pânico (`&str` ou `String`).
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "falha interna do parser".to_string()
    }
}

/// DOCX: texto de cada parágrafo do corpo, em ordem, unido por espaços simples.
///
/// Parágrafos vazios entram na junção (produzem espaços extras, que o
/// tokenizador ignora). Tabelas e imagens não são parágrafos do corpo.
fn extract_docx(bytes: &[u8]) -> Result<String, AnalysisError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| AnalysisError::Extraction(format!("DOCX inválido: {}", e)))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join(" "))
}

/// Texto de um parágrafo: Paragraph → Run → Text, runs concatenados sem separador.
fn paragraph_text(para: &Paragraph) -> String {
    let mut out = String::new();
    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                match rc {
                    RunChild::Text(t) => out.push_str(&t.text),
                    RunChild::Tab(_) => out.push('\t'),
                    RunChild::Break(_) => out.push('\n'),
                    _ => {}
                }
            }
        }
    }
    out
}

/// Texto puro: decodifica como UTF-8 e devolve sem alterações.
fn extract_plain(bytes: &[u8]) -> Result<String, AnalysisError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| AnalysisError::Extraction(format!("UTF-8 inválido: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use docx_rs::{Docx, Run};

    /// PDF de uma página com "Hello" desenhado na fonte `/F1` dada.
    ///
    /// A tabela xref é montada com os offsets reais de cada objeto.
    fn build_pdf(font: &str) -> Vec<u8> {
        let content = "BT /F1 24 Tf 72 720 Td (Hello) Tj ET";
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ),
            font.to_string(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }
        let xref_at = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for off in offsets {
            pdf.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_at
            )
            .as_bytes(),
        );
        pdf
    }

    fn build_docx(paragraphs: &[&[&str]]) -> Vec<u8> {
        let mut docx = Docx::new();
        for runs in paragraphs {
            let mut p = Paragraph::new();
            for r in runs.iter() {
                p = p.add_run(Run::new().add_text(*r));
            }
            docx = docx.add_paragraph(p);
        }
        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    #[test]
    fn plain_text_is_verbatim() {
        let raw = "Linha 1\n  Linha 2\tfim ";
        let doc = Document::new(raw.as_bytes(), DocumentFormat::Text);
        assert_eq!(extract(&doc).unwrap(), raw);
    }

    #[test]
    fn invalid_utf8_is_extraction_error() {
        let doc = Document::new(&[0xff, 0xfe, 0x41], DocumentFormat::Text);
        assert!(matches!(extract(&doc), Err(AnalysisError::Extraction(_))));
    }

    #[test]
    fn corrupt_pdf_is_extraction_error() {
        let doc = Document::new(b"isto nao e um pdf", DocumentFormat::Pdf);
        let err = extract(&doc).unwrap_err();
        assert!(matches!(err, AnalysisError::Extraction(_)));
    }

    #[test]
    fn pdf_with_standard_font() {
        let bytes = build_pdf("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>");
        let doc = Document::new(&bytes, DocumentFormat::Pdf);
        assert!(extract(&doc).unwrap().contains("Hello"));
    }

    /// Fontes malformadas fazem o pdf_extract entrar em pânico
    #[test]
    fn malformed_pdf_fonts_are_extraction_errors() {
        for font in ["<< /Type /Font >>", "<< /Type /Font /Subtype /Type3 >>"] {
            let bytes = build_pdf(font);
            let doc = Document::new(&bytes, DocumentFormat::Pdf);
            match extract(&doc) {
                Err(AnalysisError::Extraction(msg)) => {
                    assert!(msg.starts_with("PDF inválido"), "{}", msg)
                }
                other => panic!("font {}: unexpected {:?}", font, other),
            }
            // Caminho da CLI: vira um resultado de erro, sem derrubar o processo
            assert!(crate::analysis::analyze_file("bad.pdf", &bytes, 20).is_error());
        }
    }

    #[test]
    fn corrupt_docx_is_extraction_error() {
        let doc = Document::new(b"PK nope", DocumentFormat::Docx);
        assert!(matches!(extract(&doc), Err(AnalysisError::Extraction(_))));
    }

    /// Runs do mesmo parágrafo são concatenados; parágrafos unidos por espaço
    #[test]
    fn docx_paragraphs_in_order() {
        let bytes = build_docx(&[&["First ", "paragraph"], &["Second", " one"]]);
        let doc = Document::new(&bytes, DocumentFormat::Docx);
        let text = extract(&doc).unwrap();
        let words: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(words, vec!["First", "paragraph", "Second", "one"]);
    }
}
