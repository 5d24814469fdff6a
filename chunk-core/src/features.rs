//! # Extração de Features para Chunking
//!
//! O [`crate::chunkers::ClassifierChunker`] não olha apenas para n-gramas de
//! tags: para cada posição ele monta um conjunto de features nomeadas a
//! partir de uma janela `(anterior, atual, próximo)` e do rótulo IOB já
//! **previsto** para a posição anterior.
//!
//! ## Features do detector padrão ([`prev_next_pos_iob`])
//!
//! | Feature    | Valor                                   |
//! |------------|-----------------------------------------|
//! | `word`     | palavra atual                           |
//! | `pos`      | tag POS atual                           |
//! | `prevword` | palavra anterior ou `<START>`           |
//! | `prevpos`  | tag anterior ou `<START>`               |
//! | `previob`  | rótulo IOB anterior ou `<START>`        |
//! | `nextword` | próxima palavra ou `<END>`              |
//! | `nextpos`  | próxima tag ou `<END>`                  |
//!
//! Como `previob` depende da predição em `i-1`, a classificação precisa ser
//! feita posição a posição, da esquerda para a direita.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tagger::TaggedToken;

/// Marcador de início de sentença.
pub const START: &str = "<START>";
/// Marcador de fim de sentença.
pub const END: &str = "<END>";

/// Conjunto de features `nome → valor` de uma posição.
///
/// Um `BTreeMap` mantém a ordem das features estável, o que deixa o treino
/// dos classificadores determinístico.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub features: BTreeMap<String, String>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.features.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.features.get(name).map(String::as_str)
    }

    /// Features binárias `nome=valor`, a forma esparsa usada por modelos lineares.
    pub fn indicators(&self) -> impl Iterator<Item = String> + '_ {
        self.features.iter().map(|(k, v)| format!("{k}={v}"))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Extrai as features da posição `index`, dado o histórico de rótulos das
/// posições anteriores (`history.len() == index` durante a predição).
pub type FeatureDetector = fn(&[TaggedToken], usize, &[String]) -> FeatureSet;

/// Detector padrão: janela de uma palavra para cada lado mais o rótulo anterior.
pub fn prev_next_pos_iob(tokens: &[TaggedToken], index: usize, history: &[String]) -> FeatureSet {
    let current = &tokens[index];

    let (prevword, prevpos, previob) = if index == 0 {
        (START, START, START)
    } else {
        let prev = &tokens[index - 1];
        let previob = history.get(index - 1).map(String::as_str).unwrap_or(START);
        (prev.word.as_str(), prev.tag.as_str(), previob)
    };

    let (nextword, nextpos) = match tokens.get(index + 1) {
        Some(next) => (next.word.as_str(), next.tag.as_str()),
        None => (END, END),
    };

    let mut fs = FeatureSet::new();
    fs.insert("word", current.word.as_str());
    fs.insert("pos", current.tag.as_str());
    fs.insert("nextword", nextword);
    fs.insert("nextpos", nextpos);
    fs.insert("prevword", prevword);
    fs.insert("prevpos", prevpos);
    fs.insert("previob", previob);
    fs
}

/// Apenas a palavra atual.
pub fn unigram_feature_detector(tokens: &[TaggedToken], index: usize, _history: &[String]) -> FeatureSet {
    let mut fs = FeatureSet::new();
    fs.insert("word", tokens[index].word.as_str());
    fs
}
