//! # Módulo Core — Tipos Fundamentais do Domínio
//!
//! Tipos que atravessam todo o pipeline de análise:
//!
//! - [`Document`] / [`DocumentFormat`] — bytes de entrada + formato declarado
//! - [`FrequencyEntry`] / [`FrequencyTable`] — ranking de palavras produzido pelo ranker
//! - [`AnalysisError`] — taxonomia de falhas (formato, extração, texto vazio)
//!
//! ## Fluxo dos Tipos
//!
//! ```text
//! Document ──extract──► String ──rank──► FrequencyTable
//!     │                   │
//!     └─ UnsupportedFormat / Extraction   └─ EmptyText
//! ```

/// Sub-módulo com [`Document`] e [`DocumentFormat`].
pub mod document;

/// Sub-módulo com [`AnalysisError`].
pub mod error;

/// Sub-módulo com [`FrequencyEntry`] e [`FrequencyTable`].
pub mod frequency;

pub use document::{Document, DocumentFormat};
pub use error::AnalysisError;
pub use frequency::{FrequencyEntry, FrequencyTable};
