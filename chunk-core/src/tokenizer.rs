//! # Tokenizador
//!
//! Divide o texto bruto em tokens (palavras e pontuação) usando as fronteiras
//! de palavra Unicode (UAX #29) do crate `unicode-segmentation`. Cada token
//! preserva a posição original no texto (offset em bytes) para permitir
//! destacar chunks na interface web.
//!
//! Espaços são descartados. Abreviações conhecidas (`Mr.`, `Nov.`) mantêm o
//! ponto, que de outro modo viraria um token separado.
//!
//! ```rust
//! use chunk_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("Mr. Vinken joined the board.");
//! let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(words, ["Mr.", "Vinken", "joined", "the", "board", "."]);
//! ```

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Um token extraído do texto original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "book", ",").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

/// Abreviações inglesas cujo ponto faz parte da palavra.
const ABBREVIATIONS: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sr", "Jr", "St", "Inc", "Corp", "Co", "Ltd", "vs", "etc",
    "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug", "Sep", "Sept", "Oct", "Nov", "Dec",
];

pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();

    for (start, segment) in text.split_word_bound_indices() {
        if segment.chars().all(char::is_whitespace) {
            continue;
        }

        // "Nov" + "." → "Nov."
        if segment == "." {
            if let Some(prev) = tokens.last_mut() {
                if prev.end == start && ABBREVIATIONS.contains(&prev.text.as_str()) {
                    prev.text.push('.');
                    prev.end = start + 1;
                    continue;
                }
            }
        }

        tokens.push(Token {
            text: segment.to_string(),
            start,
            end: start + segment.len(),
            index: tokens.len(),
        });
    }

    tokens
}

/// Apenas os textos dos tokens.
pub fn words(text: &str) -> Vec<String> {
    tokenize(text).into_iter().map(|t| t.text).collect()
}
