//! # Ranker de Frequências — Tokenizar, Filtrar, Contar, Ranquear
//!
//! O [`rank()`] é uma **função pura**: o mesmo texto com o mesmo top-N
//! produz sempre a mesma tabela. Não há estado entre chamadas.
//!
//! ## Algoritmo
//!
//! ```text
//! texto
//!   ├── 0. Texto vazio/só espaços?  → AnalysisError::EmptyText
//!   ├── 1. Tokenizar: runs máximos de [\p{L}\p{N}_] no texto em minúsculas
//!   ├── 2. Filtrar: len ≤ 2 ou stopword → descarta
//!   ├── 3. Contar: igualdade exata de string
//!   ├── 4. Ranquear: contagem desc, empate → ordem da 1ª aparição
//!   └── 5. Truncar em top-N
//! ```
//!
//! ## O que é uma "palavra"?
//!
//! Um run máximo de caracteres de palavra: letras (`\p{L}`), números
//! (`\p{N}`, incluindo `½`) e underscore. Todo o resto é separador,
//! inclusive marcas combinantes (`\u{308}`) e outros conectores (`‿`),
//! que o `\w` do crate `regex` aceitaria. Sem stemming, sem segmentação por locale,
//! sem remoção de acentos: apenas `to_lowercase()`.
//!
//! ## Exemplo
//!
//! ```text
//! "The Fox jumps. The FOX runs!"  (top-N = 5)
//! → tokens:    the fox jumps the fox runs
//! → filtrados: fox jumps fox runs
//! → [fox: 2, jumps: 1, runs: 1]
//! ```

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::{AnalysisError, FrequencyEntry, FrequencyTable};

/// Stopwords descartadas independentemente da frequência.
///
/// Lista fechada; não é configurável.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with", "i", "you", "we", "they",
    "this", "these", "those", "or", "but", "if", "so", "do", "does", "did",
];

/// Tokens com este número de caracteres (ou menos) são descartados.
const MIN_WORD_CHARS: usize = 2;

/// Regex de tokenização, compilada uma única vez.
static WORD_RE: OnceLock<Regex> = OnceLock::new();

fn word_regex() -> &'static Regex {
    WORD_RE.get_or_init(|| Regex::new(r"[\p{L}\p{N}_]+").expect("invalid regex"))
}

/// Verifica se uma palavra está na lista fixa de stopwords.
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Tokeniza o texto em minúsculas e aplica os filtros de comprimento e stopwords.
///
/// A ordem dos tokens é preservada — o ranker depende dela para desempatar.
pub fn filtered_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    word_regex()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() > MIN_WORD_CHARS && !is_stopword(w))
        .map(str::to_string)
        .collect()
}

/// Produz a tabela de frequências das `top_n` palavras mais comuns.
///
/// `top_n` deve ser ≥ 1; o valor 0 é tratado como 1. Limites de UI
/// (ex: 5–100) são responsabilidade de quem chama.
///
/// # Erros
///
/// [`AnalysisError::EmptyText`] se o texto é vazio ou só espaços.
/// Um texto que não sobrevive aos filtros produz uma tabela vazia, não erro.
pub fn rank(text: &str, top_n: usize) -> Result<FrequencyTable, AnalysisError> {
    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyText);
    }
    let top_n = top_n.max(1);

    let tokens = filtered_tokens(text);

    // Contagem preservando a ordem da primeira aparição:
    // `index` aponta para a posição da palavra em `entries`.
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<FrequencyEntry> = Vec::new();
    for token in &tokens {
        match index.get(token.as_str()) {
            Some(&i) => entries[i].count += 1,
            None => {
                index.insert(token.as_str(), entries.len());
                entries.push(FrequencyEntry {
                    word: token.clone(),
                    count: 1,
                });
            }
        }
    }

    // sort_by é estável: empates mantêm a ordem da primeira aparição
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(top_n);

    tracing::debug!(
        tokens = tokens.len(),
        distinct = index.len(),
        returned = entries.len(),
        "Ranking concluído"
    );

    Ok(FrequencyTable::from_ranked(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pairs(table: &FrequencyTable) -> Vec<(&str, usize)> {
        table.iter().map(|e| (e.word.as_str(), e.count)).collect()
    }

    const SAMPLE: &str = "
    The quick brown fox jumps over the lazy dog. The fox is very quick and agile.
    The dog is lazy and slow. The fox runs fast through the forest.
    The dog sleeps under the tree. The fox and the dog are different animals.
    The quick fox jumps over the lazy dog again and again.
    ";

    // ─── tokenização e filtros ─────────────────────────────────

    #[test]
    fn mixed_case_and_punctuation() {
        let table = rank("The Fox jumps. The FOX runs!", 5).unwrap();
        assert_eq!(pairs(&table), vec![("fox", 2), ("jumps", 1), ("runs", 1)]);
    }

    #[test]
    fn stopwords_and_short_words_yield_empty_table() {
        let table = rank("a an it is ok go", 10).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn three_char_words_survive() {
        let table = rank("cat cat sun", 10).unwrap();
        assert_eq!(pairs(&table), vec![("cat", 2), ("sun", 1)]);
    }

    #[test]
    fn underscore_and_digits_are_word_characters() {
        let table = rank("snake_case 2024 snake_case x-ray", 10).unwrap();
        // "x-ray" quebra em "x" e "ray"; só "ray" sobrevive
        assert_eq!(pairs(&table), vec![("snake_case", 2), ("2024", 1), ("ray", 1)]);
    }

    #[test]
    fn combining_mark_splits_word() {
        // "nai" + U+0308 + "ve": a marca separa; "ve" cai no filtro de tamanho
        let table = rank("nai\u{308}ve", 10).unwrap();
        assert_eq!(pairs(&table), vec![("nai", 1)]);
    }

    #[test]
    fn connector_punctuation_other_than_underscore_splits_word() {
        let table = rank("abc\u{203F}def", 10).unwrap();
        assert_eq!(pairs(&table), vec![("abc", 1), ("def", 1)]);
    }

    #[test]
    fn numeric_fraction_is_word_character() {
        let table = rank("x½yz", 10).unwrap();
        assert_eq!(pairs(&table), vec![("x½yz", 1)]);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // "né" tem 3 bytes mas 2 caracteres → descartado
        let table = rank("né né ação", 10).unwrap();
        assert_eq!(pairs(&table), vec![("ação", 1)]);
    }

    #[test]
    fn stopword_lookup() {
        assert!(is_stopword("those"));
        assert!(is_stopword("does"));
        assert!(!is_stopword("fox"));
    }

    // ─── empty text ────────────────────────────────────────────

    #[test]
    fn whitespace_only_is_empty_text_error() {
        assert_eq!(rank("  \n\t  ", 20).unwrap_err(), AnalysisError::EmptyText);
        assert_eq!(rank("", 20).unwrap_err(), AnalysisError::EmptyText);
    }

    // ─── ranking e truncamento ─────────────────────────────────

    #[test]
    fn truncates_with_first_appearance_order() {
        let words: Vec<String> = (0..30).map(|i| format!("word{:02}", i)).collect();
        let text = words.join(" ");
        let table = rank(&text, 20).unwrap();
        assert_eq!(table.len(), 20);
        assert!(table.iter().all(|e| e.count == 1));
        let got: Vec<&str> = table.iter().map(|e| e.word.as_str()).collect();
        let expected: Vec<&str> = words.iter().take(20).map(String::as_str).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn zero_top_n_behaves_as_one() {
        let table = rank("alpha beta beta", 0).unwrap();
        assert_eq!(pairs(&table), vec![("beta", 2)]);
    }

    #[test]
    fn sample_document_ranking() {
        let table = rank(SAMPLE, 10).unwrap();
        let top = pairs(&table);
        assert_eq!(top[0], ("fox", 5));
        assert_eq!(top[1], ("dog", 5));
        assert_eq!(top[2], ("quick", 3));
        assert_eq!(top[3], ("lazy", 3));
        assert!(!top.iter().any(|(w, _)| *w == "the" || *w == "and"));
    }

    /// Propriedades gerais: limite, ordenação, unicidade, idempotência
    #[test]
    fn table_invariants_hold() {
        for n in [1, 3, 5, 50] {
            let table = rank(SAMPLE, n).unwrap();
            assert!(table.len() <= n);
            assert!(table.entries().windows(2).all(|w| w[0].count >= w[1].count));
            let unique: HashSet<&str> = table.iter().map(|e| e.word.as_str()).collect();
            assert_eq!(unique.len(), table.len());
            assert!(table.iter().all(|e| e.count > 0));
            assert_eq!(rank(SAMPLE, n).unwrap(), table);
        }
    }
}
