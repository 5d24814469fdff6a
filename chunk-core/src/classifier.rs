//! # Capacidade de Classificação e Tagger Sequencial
//!
//! O crate não depende de um algoritmo de classificação específico: qualquer
//! tipo que implemente [`ClassifierTrainer`] / [`Classifier`] pode dirigir o
//! [`crate::chunkers::ClassifierChunker`]. O [`crate::perceptron`] fornece
//! uma implementação de referência.

use tracing::debug;

use crate::features::{FeatureDetector, FeatureSet};
use crate::tagger::TaggedToken;

/// Modelo treinado: atribui um rótulo a um conjunto de features.
///
/// Modelos são imutáveis depois do treino e podem ser compartilhados entre threads.
pub trait Classifier: Send + Sync {
    fn classify(&self, features: &FeatureSet) -> String;
}

/// Algoritmo de treino que produz um [`Classifier`].
pub trait ClassifierTrainer {
    type Model: Classifier;

    fn train(&self, labeled: &[(FeatureSet, String)]) -> Self::Model;
}

/// Tagger dirigido por classificador sobre tokens `(palavra, tag)`.
///
/// No treino o histórico é o ouro; na predição é o que o próprio modelo
/// previu até ali, por isso [`ClassifierTagger::tag`] é estritamente sequencial.
#[derive(Debug, Clone)]
pub struct ClassifierTagger<M> {
    model: M,
    detector: FeatureDetector,
}

impl<M: Classifier> ClassifierTagger<M> {
    pub fn train<T>(train_sents: &[Vec<(TaggedToken, String)>], trainer: &T, detector: FeatureDetector) -> Self
    where
        T: ClassifierTrainer<Model = M>,
    {
        let mut labeled = Vec::new();
        for sentence in train_sents {
            let tokens: Vec<TaggedToken> = sentence.iter().map(|(t, _)| t.clone()).collect();
            let mut history: Vec<String> = Vec::with_capacity(sentence.len());
            for (index, (_, label)) in sentence.iter().enumerate() {
                labeled.push((detector(&tokens, index, &history), label.clone()));
                history.push(label.clone());
            }
        }
        debug!(
            sentences = train_sents.len(),
            samples = labeled.len(),
            "training classifier tagger"
        );

        Self {
            model: trainer.train(&labeled),
            detector,
        }
    }

    /// Usa um modelo já treinado (ou um dublê em testes).
    pub fn from_model(model: M, detector: FeatureDetector) -> Self {
        Self { model, detector }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Rotula cada posição em ordem; a posição `i` vê as predições de `0..i`.
    pub fn tag(&self, tokens: &[TaggedToken]) -> Vec<String> {
        let mut history: Vec<String> = Vec::with_capacity(tokens.len());
        for index in 0..tokens.len() {
            let features = (self.detector)(tokens, index, &history);
            history.push(self.model.classify(&features));
        }
        history
    }
}
