//! # FrequencyTable — Ranking de Palavras
//!
//! Uma [`FrequencyTable`] é a saída final do ranker: uma sequência de
//! [`FrequencyEntry`] ordenada por contagem decrescente, com empates na
//! ordem da primeira aparição.
//!
//! ## Invariantes
//!
//! - palavras únicas
//! - contagens estritamente positivas
//! - contagens não-crescentes ao longo da tabela
//! - comprimento ≤ top-N pedido (garantido por quem constrói, o ranker)
//!
//! ## Serialização
//!
//! A tabela serializa como array JSON puro:
//!
//! ```json
//! [{"word": "fox", "count": 5}, {"word": "dog", "count": 3}]
//! ```

use serde::{Deserialize, Serialize};

/// Par imutável (palavra normalizada, contagem).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    /// Token normalizado (minúsculas).
    pub word: String,
    /// Número de ocorrências (> 0).
    pub count: usize,
}

/// Tabela de frequências ranqueada.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    /// Constrói a tabela a partir de entradas já ranqueadas.
    ///
    /// Só o ranker chama isto; as invariantes são verificadas em debug.
    pub(crate) fn from_ranked(entries: Vec<FrequencyEntry>) -> Self {
        debug_assert!(entries.iter().all(|e| e.count > 0));
        debug_assert!(entries.windows(2).all(|w| w[0].count >= w[1].count));
        Self { entries }
    }

    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maior contagem da tabela (0 se vazia). Usado como escala do gráfico.
    pub fn max_count(&self) -> usize {
        self.entries.first().map(|e| e.count).unwrap_or(0)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FrequencyEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a FrequencyTable {
    type Item = &'a FrequencyEntry;
    type IntoIter = std::slice::Iter<'a, FrequencyEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
