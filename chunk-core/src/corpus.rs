//! # Corpus em Inglês com Chunks Anotados
//!
//! Pequeno corpus anotado manualmente no formato CoNLL (palavra, tag POS
//! Penn Treebank, rótulo IOB). Serve para treinar a cadeia de POS e os
//! chunkers da demonstração e como dado de teste.
//!
//! ## Domínios Cobertos
//! - Notícias e negócios
//! - Culinária
//! - Livros e cultura
//! - Esportes
//! - Tecnologia

use crate::iob::iob_to_tree;
use crate::tagger::{IobTriple, TaggedToken};
use crate::tree::ChunkTree;

/// Uma sentença anotada no formato CoNLL.
pub struct ChunkedSentence {
    pub text: &'static str,
    /// Domínio temático.
    pub domain: &'static str,
    /// Triplas `(palavra, tag POS, rótulo IOB)`.
    pub annotations: &'static [(&'static str, &'static str, &'static str)],
}

impl ChunkedSentence {
    /// Triplas tipadas; anotações com rótulo IOB inválido são descartadas.
    pub fn triples(&self) -> Vec<IobTriple> {
        self.annotations
            .iter()
            .filter_map(|(w, t, l)| IobTriple::parse(w, t, l).ok())
            .collect()
    }

    pub fn tree(&self) -> ChunkTree {
        iob_to_tree(&self.triples())
    }
}

/// Retorna o corpus completo.
pub fn get_corpus() -> Vec<ChunkedSentence> {
    vec![
        // ===== NOTÍCIAS =====
        ChunkedSentence {
            text: "Pierre Vinken, 61 years old, will join the board as a nonexecutive director Nov. 29.",
            domain: "notícias",
            annotations: &[
                ("Pierre", "NNP", "B-NP"), ("Vinken", "NNP", "I-NP"), (",", ",", "O"),
                ("61", "CD", "B-NP"), ("years", "NNS", "I-NP"), ("old", "JJ", "O"), (",", ",", "O"),
                ("will", "MD", "O"), ("join", "VB", "O"), ("the", "DT", "B-NP"), ("board", "NN", "I-NP"),
                ("as", "IN", "O"), ("a", "DT", "B-NP"), ("nonexecutive", "JJ", "I-NP"),
                ("director", "NN", "I-NP"), ("Nov.", "NNP", "B-NP"), ("29", "CD", "I-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "Mr. Vinken is chairman of Elsevier N.V., the Dutch publishing group.",
            domain: "notícias",
            annotations: &[
                ("Mr.", "NNP", "B-NP"), ("Vinken", "NNP", "I-NP"), ("is", "VBZ", "O"),
                ("chairman", "NN", "B-NP"), ("of", "IN", "O"), ("Elsevier", "NNP", "B-NP"),
                ("N.V.", "NNP", "I-NP"), (",", ",", "O"), ("the", "DT", "B-NP"), ("Dutch", "NNP", "I-NP"),
                ("publishing", "VBG", "I-NP"), ("group", "NN", "I-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "The company reported a strong profit in the third quarter.",
            domain: "notícias",
            annotations: &[
                ("The", "DT", "B-NP"), ("company", "NN", "I-NP"), ("reported", "VBD", "O"),
                ("a", "DT", "B-NP"), ("strong", "JJ", "I-NP"), ("profit", "NN", "I-NP"),
                ("in", "IN", "O"), ("the", "DT", "B-NP"), ("third", "JJ", "I-NP"),
                ("quarter", "NN", "I-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "Investors sold the shares after the announcement.",
            domain: "notícias",
            annotations: &[
                ("Investors", "NNS", "B-NP"), ("sold", "VBD", "O"), ("the", "DT", "B-NP"),
                ("shares", "NNS", "I-NP"), ("after", "IN", "O"), ("the", "DT", "B-NP"),
                ("announcement", "NN", "I-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "The new chief executive was named on Monday.",
            domain: "notícias",
            annotations: &[
                ("The", "DT", "B-NP"), ("new", "JJ", "I-NP"), ("chief", "JJ", "I-NP"),
                ("executive", "NN", "I-NP"), ("was", "VBD", "O"), ("named", "VBN", "O"),
                ("on", "IN", "O"), ("Monday", "NNP", "B-NP"), (".", ".", "O"),
            ],
        },
        // ===== CULINÁRIA =====
        ChunkedSentence {
            text: "The book of recipes is delicious.",
            domain: "culinária",
            annotations: &[
                ("The", "DT", "B-NP"), ("book", "NN", "I-NP"), ("of", "IN", "O"),
                ("recipes", "NNS", "B-NP"), ("is", "VBZ", "O"), ("delicious", "JJ", "O"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "My mother bakes a chocolate cake every weekend.",
            domain: "culinária",
            annotations: &[
                ("My", "PRP$", "B-NP"), ("mother", "NN", "I-NP"), ("bakes", "VBZ", "O"),
                ("a", "DT", "B-NP"), ("chocolate", "NN", "I-NP"), ("cake", "NN", "I-NP"),
                ("every", "DT", "B-NP"), ("weekend", "NN", "I-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "The chef added fresh herbs and a little salt.",
            domain: "culinária",
            annotations: &[
                ("The", "DT", "B-NP"), ("chef", "NN", "I-NP"), ("added", "VBD", "O"),
                ("fresh", "JJ", "B-NP"), ("herbs", "NNS", "I-NP"), ("and", "CC", "O"),
                ("a", "DT", "B-NP"), ("little", "JJ", "I-NP"), ("salt", "NN", "I-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "This soup tastes like chicken.",
            domain: "culinária",
            annotations: &[
                ("This", "DT", "B-NP"), ("soup", "NN", "I-NP"), ("tastes", "VBZ", "O"),
                ("like", "IN", "O"), ("chicken", "NN", "B-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "The kitchen was full of hungry children.",
            domain: "culinária",
            annotations: &[
                ("The", "DT", "B-NP"), ("kitchen", "NN", "I-NP"), ("was", "VBD", "O"),
                ("full", "JJ", "O"), ("of", "IN", "O"), ("hungry", "JJ", "B-NP"),
                ("children", "NNS", "I-NP"), (".", ".", "O"),
            ],
        },
        // ===== LIVROS E CULTURA =====
        ChunkedSentence {
            text: "The book was great.",
            domain: "cultura",
            annotations: &[
                ("The", "DT", "B-NP"), ("book", "NN", "I-NP"), ("was", "VBD", "O"),
                ("great", "JJ", "O"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "This gripping book is fantastic.",
            domain: "cultura",
            annotations: &[
                ("This", "DT", "B-NP"), ("gripping", "VBG", "I-NP"), ("book", "NN", "I-NP"),
                ("is", "VBZ", "O"), ("fantastic", "JJ", "O"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "The author signed copies of her latest novel.",
            domain: "cultura",
            annotations: &[
                ("The", "DT", "B-NP"), ("author", "NN", "I-NP"), ("signed", "VBD", "O"),
                ("copies", "NNS", "B-NP"), ("of", "IN", "O"), ("her", "PRP$", "B-NP"),
                ("latest", "JJS", "I-NP"), ("novel", "NN", "I-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "Our children are learning the old songs.",
            domain: "cultura",
            annotations: &[
                ("Our", "PRP$", "B-NP"), ("children", "NNS", "I-NP"), ("are", "VBP", "O"),
                ("learning", "VBG", "O"), ("the", "DT", "B-NP"), ("old", "JJ", "I-NP"),
                ("songs", "NNS", "I-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "The museum opened a new exhibition of modern paintings.",
            domain: "cultura",
            annotations: &[
                ("The", "DT", "B-NP"), ("museum", "NN", "I-NP"), ("opened", "VBD", "O"),
                ("a", "DT", "B-NP"), ("new", "JJ", "I-NP"), ("exhibition", "NN", "I-NP"),
                ("of", "IN", "O"), ("modern", "JJ", "B-NP"), ("paintings", "NNS", "I-NP"), (".", ".", "O"),
            ],
        },
        // ===== ESPORTES =====
        ChunkedSentence {
            text: "The home team won the final game.",
            domain: "esportes",
            annotations: &[
                ("The", "DT", "B-NP"), ("home", "NN", "I-NP"), ("team", "NN", "I-NP"),
                ("won", "VBD", "O"), ("the", "DT", "B-NP"), ("final", "JJ", "I-NP"),
                ("game", "NN", "I-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "The young striker scored two goals in the second half.",
            domain: "esportes",
            annotations: &[
                ("The", "DT", "B-NP"), ("young", "JJ", "I-NP"), ("striker", "NN", "I-NP"),
                ("scored", "VBD", "O"), ("two", "CD", "B-NP"), ("goals", "NNS", "I-NP"),
                ("in", "IN", "O"), ("the", "DT", "B-NP"), ("second", "JJ", "I-NP"),
                ("half", "NN", "I-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "Fans filled the stadium on Saturday.",
            domain: "esportes",
            annotations: &[
                ("Fans", "NNS", "B-NP"), ("filled", "VBD", "O"), ("the", "DT", "B-NP"),
                ("stadium", "NN", "I-NP"), ("on", "IN", "O"), ("Saturday", "NNP", "B-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "The coach is proud of his players.",
            domain: "esportes",
            annotations: &[
                ("The", "DT", "B-NP"), ("coach", "NN", "I-NP"), ("is", "VBZ", "O"),
                ("proud", "JJ", "O"), ("of", "IN", "O"), ("his", "PRP$", "B-NP"),
                ("players", "NNS", "I-NP"), (".", ".", "O"),
            ],
        },
        // ===== TECNOLOGIA =====
        ChunkedSentence {
            text: "The engineers released a faster version of the software.",
            domain: "tecnologia",
            annotations: &[
                ("The", "DT", "B-NP"), ("engineers", "NNS", "I-NP"), ("released", "VBD", "O"),
                ("a", "DT", "B-NP"), ("faster", "JJR", "I-NP"), ("version", "NN", "I-NP"),
                ("of", "IN", "O"), ("the", "DT", "B-NP"), ("software", "NN", "I-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "Users can download the app from the store.",
            domain: "tecnologia",
            annotations: &[
                ("Users", "NNS", "B-NP"), ("can", "MD", "O"), ("download", "VB", "O"),
                ("the", "DT", "B-NP"), ("app", "NN", "I-NP"), ("from", "IN", "O"),
                ("the", "DT", "B-NP"), ("store", "NN", "I-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "The small startup hired ten developers in March.",
            domain: "tecnologia",
            annotations: &[
                ("The", "DT", "B-NP"), ("small", "JJ", "I-NP"), ("startup", "NN", "I-NP"),
                ("hired", "VBD", "O"), ("ten", "CD", "B-NP"), ("developers", "NNS", "I-NP"),
                ("in", "IN", "O"), ("March", "NNP", "B-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "A security update fixed the bug.",
            domain: "tecnologia",
            annotations: &[
                ("A", "DT", "B-NP"), ("security", "NN", "I-NP"), ("update", "NN", "I-NP"),
                ("fixed", "VBD", "O"), ("the", "DT", "B-NP"), ("bug", "NN", "I-NP"), (".", ".", "O"),
            ],
        },
        ChunkedSentence {
            text: "The phone has a large screen and a long battery life.",
            domain: "tecnologia",
            annotations: &[
                ("The", "DT", "B-NP"), ("phone", "NN", "I-NP"), ("has", "VBZ", "O"),
                ("a", "DT", "B-NP"), ("large", "JJ", "I-NP"), ("screen", "NN", "I-NP"),
                ("and", "CC", "O"), ("a", "DT", "B-NP"), ("long", "JJ", "I-NP"),
                ("battery", "NN", "I-NP"), ("life", "NN", "I-NP"), (".", ".", "O"),
            ],
        },
    ]
}

/// Árvores de chunks do corpus, prontas para treinar chunkers.
pub fn chunked_sents() -> Vec<ChunkTree> {
    get_corpus().iter().map(ChunkedSentence::tree).collect()
}

/// Sentenças `(palavra, tag POS)` para treinar a cadeia de POS.
pub fn tagged_sents() -> Vec<Vec<TaggedToken>> {
    get_corpus()
        .iter()
        .map(|s| s.annotations.iter().map(|&(w, t, _)| TaggedToken::new(w, t)).collect())
        .collect()
}

/// Textos de demonstração para a interface web.
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Culinária",
            "The book of recipes is delicious. My mother bakes a chocolate cake for the hungry children every weekend.",
        ),
        (
            "Notícias",
            "Pierre Vinken, 61 years old, will join the board as a nonexecutive director Nov. 29. The company reported a strong profit in the third quarter.",
        ),
        (
            "Livros",
            "This gripping book is fantastic. The author signed copies of her latest novel at the museum on Saturday.",
        ),
        (
            "Esportes",
            "The young striker scored two goals in the final game. The coach is proud of his players.",
        ),
        (
            "Tecnologia",
            "The engineers released a faster version of the app. A security update fixed the bug in the store.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iob::tree_to_iob;

    #[test]
    fn test_corpus_annotations_are_valid() {
        for sentence in get_corpus() {
            assert_eq!(
                sentence.triples().len(),
                sentence.annotations.len(),
                "invalid IOB label in: {}",
                sentence.text
            );
        }
    }

    #[test]
    fn test_chunked_sents_round_trip() {
        for (tree, sentence) in chunked_sents().iter().zip(get_corpus()) {
            assert_eq!(tree_to_iob(tree).unwrap(), sentence.triples());
        }
    }

    #[test]
    fn test_tagged_sents_align_with_trees() {
        let trees = chunked_sents();
        let sents = tagged_sents();
        assert_eq!(trees.len(), sents.len());
        assert_eq!(trees[0].leaves(), sents[0]);
        assert!(sents.iter().flatten().any(|t| t.word == "the" && t.tag == "DT"));
    }
}
