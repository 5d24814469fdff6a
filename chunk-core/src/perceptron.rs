//! # Averaged Perceptron
//!
//! Classificador de referência para o [`crate::chunkers::ClassifierChunker`].
//! Algoritmo online simples: só atualiza os pesos quando erra.
//! Utiliza "Lazy Averaging" para evitar custo O(N*T) na atualização dos pesos médios.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::{Classifier, ClassifierTrainer};
use crate::features::FeatureSet;

/// Configuração de treino do Perceptron Médio.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AveragedPerceptron {
    /// Número de passadas completas pelos exemplos.
    pub iterations: usize,
}

impl Default for AveragedPerceptron {
    fn default() -> Self {
        Self { iterations: 5 }
    }
}

impl AveragedPerceptron {
    pub fn new(iterations: usize) -> Self {
        Self { iterations }
    }
}

impl ClassifierTrainer for AveragedPerceptron {
    type Model = PerceptronModel;

    fn train(&self, labeled: &[(FeatureSet, String)]) -> PerceptronModel {
        let mut model = PerceptronModel::new();
        model.fit(labeled, self.iterations);
        model
    }
}

/// Modelo Perceptron Médio (Averaged Perceptron).
///
/// A versão padrão do Perceptron oscila muito. O "Averaged" usa a **média** dos pesos
/// de todas as iterações como modelo final, o que reduz overfitting e estabiliza o aprendizado.
///
/// # Lazy Averaging
/// A média de uma feature só é atualizada **quando ela é ativa**, o que
/// mantém custo constante por passo e dá o mesmo modelo final.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerceptronModel {
    /// Pesos atuais $w$: indicador -> rótulo -> peso.
    weights: HashMap<String, HashMap<String, f64>>,
    /// Soma acumulada dos pesos: (indicador, rótulo) -> $\sum w_t$.
    #[serde(skip)]
    total_weights: HashMap<(String, String), f64>,
    /// Último passo em que o peso foi atualizado (timestamp $t$).
    #[serde(skip)]
    last_update: HashMap<(String, String), usize>,
    /// Número total de passos de treino (amostras processadas).
    steps: usize,
    /// Rótulos conhecidos, ordenados.
    labels: Vec<String>,
}

impl PerceptronModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rótulos vistos no treino, em ordem alfabética.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Treina o modelo (Online Learning).
    ///
    /// Para cada exemplo, prediz com os pesos atuais e, se errar, promove o
    /// rótulo correto e penaliza o previsto. Ao final substitui os pesos
    /// pelas médias (finalize_weights).
    fn fit(&mut self, labeled: &[(FeatureSet, String)], iterations: usize) {
        let label_set: BTreeSet<&str> = labeled.iter().map(|(_, l)| l.as_str()).collect();
        self.labels = label_set.into_iter().map(str::to_string).collect();

        for epoch in 0..iterations {
            let mut mistakes = 0usize;
            for (features, true_label) in labeled {
                let indicators: Vec<String> = features.indicators().collect();
                let pred_label = self.predict_single(&indicators);

                // Atualiza apenas em caso de erro (mistake-driven)
                if pred_label != *true_label {
                    self.update(&indicators, true_label, &pred_label);
                    mistakes += 1;
                }

                self.steps += 1;
            }
            debug!(epoch, mistakes, samples = labeled.len(), "perceptron epoch");
        }

        self.finalize_weights();
    }

    /// Melhor rótulo; empates ficam com o primeiro na ordem alfabética.
    fn predict_single(&self, indicators: &[String]) -> String {
        let mut best_label = self.labels.first().cloned().unwrap_or_default();
        let mut best_score = f64::NEG_INFINITY;

        for label in &self.labels {
            let score = self.score_label(indicators, label);
            if score > best_score {
                best_score = score;
                best_label = label.clone();
            }
        }
        best_label
    }

    fn score_label(&self, indicators: &[String], label: &str) -> f64 {
        indicators
            .iter()
            .filter_map(|f| self.weights.get(f)?.get(label))
            .sum()
    }

    /// $w_{correto} \leftarrow w_{correto} + \phi(x)$
    /// $w_{errado} \leftarrow w_{errado} - \phi(x)$
    fn update(&mut self, indicators: &[String], true_label: &str, pred_label: &str) {
        for f in indicators {
            self.update_feature(f, true_label, 1.0);
            self.update_feature(f, pred_label, -1.0);
        }
    }

    /// Atualiza uma feature específica aplicando Lazy Averaging.
    fn update_feature(&mut self, fname: &str, label: &str, delta: f64) {
        let key = (fname.to_string(), label.to_string());

        // 1. acumula o peso ANTIGO pelos passos em que ficou constante
        let current_w = self
            .weights
            .get(fname)
            .and_then(|per_label| per_label.get(label))
            .copied()
            .unwrap_or(0.0);
        let last_step = *self.last_update.get(&key).unwrap_or(&0);
        let steps_since_update = (self.steps - last_step) as f64;

        *self.total_weights.entry(key.clone()).or_insert(0.0) += steps_since_update * current_w;
        self.last_update.insert(key, self.steps);

        // 2. aplica a mudança
        *self
            .weights
            .entry(fname.to_string())
            .or_default()
            .entry(label.to_string())
            .or_insert(0.0) += delta;
    }

    /// Finaliza o treinamento calculando as médias finais.
    fn finalize_weights(&mut self) {
        let steps_f64 = self.steps as f64;
        if steps_f64 > 0.0 {
            for (fname, per_label) in &mut self.weights {
                for (label, w) in per_label.iter_mut() {
                    let key = (fname.clone(), label.clone());
                    let last_step = self.last_update.get(&key).copied().unwrap_or(0);
                    let total = self.total_weights.get(&key).copied().unwrap_or(0.0)
                        + (self.steps - last_step) as f64 * *w;
                    // Substitui o peso atual pela média ($ \sum w_t / T $)
                    *w = total / steps_f64;
                }
            }
        }

        self.total_weights.clear();
        self.last_update.clear();
    }
}

impl Classifier for PerceptronModel {
    fn classify(&self, features: &FeatureSet) -> String {
        let indicators: Vec<String> = features.indicators().collect();
        self.predict_single(&indicators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pairs: &[(&str, &str)], label: &str) -> (FeatureSet, String) {
        (pairs.iter().copied().collect(), label.to_string())
    }

    #[test]
    fn test_perceptron_learns_separable_data() {
        let data = vec![
            sample(&[("pos", "DT"), ("previob", "O")], "B-NP"),
            sample(&[("pos", "NN"), ("previob", "B-NP")], "I-NP"),
            sample(&[("pos", "VBZ"), ("previob", "I-NP")], "O"),
            sample(&[("pos", "DT"), ("previob", "<START>")], "B-NP"),
            sample(&[("pos", "JJ"), ("previob", "B-NP")], "I-NP"),
        ];

        let model = AveragedPerceptron::new(10).train(&data);
        assert_eq!(model.labels(), ["B-NP", "I-NP", "O"]);

        for (features, label) in &data {
            assert_eq!(&model.classify(features), label);
        }
    }

    #[test]
    fn test_model_survives_json_round_trip() {
        let data = vec![
            sample(&[("pos", "DT")], "B-NP"),
            sample(&[("pos", "VBZ")], "O"),
        ];
        let model = AveragedPerceptron::new(3).train(&data);

        let json = serde_json::to_string(&model).unwrap();
        let reloaded: PerceptronModel = serde_json::from_str(&json).unwrap();

        assert_eq!(reloaded.labels(), model.labels());
        for (features, label) in &data {
            assert_eq!(&reloaded.classify(features), label);
        }
    }

    #[test]
    fn test_untrained_model_is_total() {
        let model = PerceptronModel::new();
        assert_eq!(model.classify(&FeatureSet::new()), "");
    }
}
