//! # Avaliação de Chunkers
//!
//! Compara árvores previstas com árvores de referência no nível de chunk:
//! um chunk só conta como acerto se começa e termina nos mesmos tokens e
//! tem o mesmo rótulo.
//!
//! - **Precisão**: chunks corretos / chunks previstos
//! - **Recall**: chunks corretos / chunks de referência
//! - **F-measure**: média harmônica ponderada (alpha = 0.5)
//! - **Acurácia IOB**: fração de tokens com o mesmo rótulo IOB
//!
//! Denominadores vazios dão 0.0.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tree::{ChunkTree, Node};

/// Chunk identificado por sentença, intervalo de tokens `[start, end)` e rótulo.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkSpan {
    pub sentence: usize,
    pub start: usize,
    pub end: usize,
    pub label: String,
}

/// Acumulador de métricas sobre várias sentenças.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkScore {
    correct: BTreeSet<ChunkSpan>,
    guessed: BTreeSet<ChunkSpan>,
    tags_correct: usize,
    tags_total: usize,
    sentences: usize,
}

impl ChunkScore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Soma mais um par (referência, previsão) às estatísticas.
    pub fn score(&mut self, gold: &ChunkTree, guess: &ChunkTree) {
        let sentence = self.sentences;
        self.sentences += 1;

        let (gold_spans, gold_labels) = chunk_spans(gold, sentence);
        let (guess_spans, guess_labels) = chunk_spans(guess, sentence);
        self.correct.extend(gold_spans);
        self.guessed.extend(guess_spans);

        self.tags_total += gold_labels.len();
        self.tags_correct += gold_labels
            .iter()
            .zip(&guess_labels)
            .filter(|(a, b)| a == b)
            .count();
    }

    pub fn precision(&self) -> f64 {
        ratio(self.hits(), self.guessed.len())
    }

    pub fn recall(&self) -> f64 {
        ratio(self.hits(), self.correct.len())
    }

    pub fn f_measure(&self) -> f64 {
        self.f_measure_with_alpha(0.5)
    }

    /// `1 / (alpha/p + (1-alpha)/r)`; zero se `p` ou `r` for zero.
    pub fn f_measure_with_alpha(&self, alpha: f64) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p == 0.0 || r == 0.0 {
            return 0.0;
        }
        1.0 / (alpha / p + (1.0 - alpha) / r)
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tags_correct, self.tags_total)
    }

    /// Chunks de referência que não foram previstos.
    pub fn missed(&self) -> Vec<ChunkSpan> {
        self.correct.difference(&self.guessed).cloned().collect()
    }

    /// Chunks previstos que não existem na referência.
    pub fn incorrect(&self) -> Vec<ChunkSpan> {
        self.guessed.difference(&self.correct).cloned().collect()
    }

    fn hits(&self) -> usize {
        self.correct.intersection(&self.guessed).count()
    }
}

impl fmt::Display for ChunkScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ChunkParse score:")?;
        writeln!(f, "    IOB Accuracy: {:5.1}%", self.accuracy() * 100.0)?;
        writeln!(f, "    Precision:    {:5.1}%", self.precision() * 100.0)?;
        writeln!(f, "    Recall:       {:5.1}%", self.recall() * 100.0)?;
        write!(f, "    F-Measure:    {:5.1}%", self.f_measure() * 100.0)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Spans dos chunks de primeiro nível e o rótulo IOB de cada token.
fn chunk_spans(tree: &ChunkTree, sentence: usize) -> (Vec<ChunkSpan>, Vec<String>) {
    let mut spans = Vec::new();
    let mut labels = Vec::new();

    for child in &tree.children {
        match child {
            Node::Tree(chunk) => {
                let size = chunk.pos().len();
                if size == 0 {
                    continue;
                }
                let start = labels.len();
                labels.push(format!("B-{}", chunk.label));
                labels.extend((1..size).map(|_| format!("I-{}", chunk.label)));
                spans.push(ChunkSpan {
                    sentence,
                    start,
                    end: start + size,
                    label: chunk.label.clone(),
                });
            }
            Node::Leaf(_) | Node::Word(_) => labels.push("O".to_string()),
        }
    }

    (spans, labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(s: &str) -> ChunkTree {
        s.parse().unwrap()
    }

    #[test]
    fn test_perfect_score() {
        let gold = tree("(S (NP the/DT book/NN) is/VBZ (ADJP red/JJ))");
        let mut score = ChunkScore::new();
        score.score(&gold, &gold);
        assert_eq!(score.precision(), 1.0);
        assert_eq!(score.recall(), 1.0);
        assert_eq!(score.f_measure(), 1.0);
        assert_eq!(score.accuracy(), 1.0);
    }

    #[test]
    fn test_partial_score() {
        let gold = tree("(S (NP the/DT book/NN) is/VBZ (NP a/DT gift/NN))");
        let guess = tree("(S (NP the/DT book/NN) is/VBZ a/DT (NP gift/NN))");
        let mut score = ChunkScore::new();
        score.score(&gold, &guess);

        assert_eq!(score.precision(), 0.5);
        assert_eq!(score.recall(), 0.5);
        assert!((score.f_measure() - 0.5).abs() < 1e-9);
        // a/DT e gift/NN têm rótulos diferentes
        assert!((score.accuracy() - 0.6).abs() < 1e-9);
        assert_eq!(score.missed()[0].start, 3);
        assert_eq!(score.incorrect()[0].start, 4);
    }

    #[test]
    fn test_empty_denominators() {
        let flat = tree("(S a/DT b/NN)");
        let mut score = ChunkScore::new();
        assert_eq!(score.precision(), 0.0);
        score.score(&flat, &flat);
        assert_eq!(score.precision(), 0.0);
        assert_eq!(score.recall(), 0.0);
        assert_eq!(score.f_measure(), 0.0);
        assert_eq!(score.accuracy(), 1.0);
    }

    #[test]
    fn test_spans_are_per_sentence() {
        let a = tree("(S (NP x/NN))");
        let b = tree("(S y/VB)");
        let mut score = ChunkScore::new();
        score.score(&a, &b);
        score.score(&b, &a);
        assert_eq!(score.missed().len(), 1);
        assert_eq!(score.incorrect().len(), 1);
        assert_eq!(score.incorrect()[0].sentence, 1);
    }
}
