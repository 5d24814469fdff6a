//! # Configuração
//!
//! [`ChunkerConfig`] reúne os parâmetros do pipeline de demonstração. Todos
//! os campos têm padrão, então um JSON parcial (ou `{}`) é válido:
//!
//! ```json
//! {
//!   "tagger_classes": ["unigram", "bigram", "trigram"],
//!   "chunker": "classifier",
//!   "transforms": ["filter_insignificant", "correct_verbs"]
//! }
//! ```

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{ChunkError, Result};
use crate::ngram::TaggerClass;
use crate::transforms::{ChunkTransform, TransformPipeline, DEFAULT_INSIGNIFICANT};

/// Qual chunker o pipeline treina.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkerKind {
    /// [`crate::chunkers::TagChunker`]
    #[default]
    Tag,
    /// [`crate::chunkers::ClassifierChunker`] com perceptron médio.
    Classifier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Cadeia de POS, na ordem de construção.
    pub tagger_classes: Vec<TaggerClass>,
    /// Cadeia do TagChunker, na ordem de construção.
    pub chunker_classes: Vec<TaggerClass>,
    /// Último elo da cadeia de POS.
    pub default_tag: String,
    /// Contextos vistos `cutoff` vezes ou menos são descartados.
    pub cutoff: usize,
    pub perceptron_iterations: usize,
    /// Sufixos usados por `filter_insignificant`.
    pub insignificant_suffixes: Vec<String>,
    /// Nomes dos estágios de transformação, em ordem.
    pub transforms: Vec<String>,
    /// Emite um evento por estágio de transformação.
    pub trace_transforms: bool,
    pub chunker: ChunkerKind,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            tagger_classes: vec![
                TaggerClass::DEFAULT_AFFIX,
                TaggerClass::Unigram,
                TaggerClass::Bigram,
                TaggerClass::Trigram,
            ],
            chunker_classes: vec![TaggerClass::Unigram, TaggerClass::Bigram],
            default_tag: "NN".to_string(),
            cutoff: 0,
            perceptron_iterations: 5,
            insignificant_suffixes: DEFAULT_INSIGNIFICANT.iter().map(|s| s.to_string()).collect(),
            transforms: TransformPipeline::default()
                .names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            trace_transforms: true,
            chunker: ChunkerKind::Tag,
        }
    }
}

impl ChunkerConfig {
    /// Lê e valida a configuração.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| ChunkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let config: Self = serde_json::from_reader(reader).map_err(|e| ChunkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_tag.is_empty() {
            return Err(ChunkError::Config("default_tag must not be empty".to_string()));
        }
        self.transform_pipeline().map(|_| ())
    }

    /// Pipeline de transformação descrito por `transforms`, com os sufixos configurados.
    ///
    /// # Erros
    /// [`ChunkError::Config`] se algum estágio não existe.
    pub fn transform_pipeline(&self) -> Result<TransformPipeline> {
        self.transform_pipeline_for(self.transforms.as_slice())
    }

    /// Pipeline com os estágios `names`, aplicando os sufixos configurados
    /// a cada `filter_insignificant`.
    ///
    /// # Erros
    /// [`ChunkError::Config`] se algum estágio não existe.
    pub fn transform_pipeline_for<S: AsRef<str>>(&self, names: &[S]) -> Result<TransformPipeline> {
        let mut pipeline = TransformPipeline::from_names(names)?;
        for stage in &mut pipeline.stages {
            if let ChunkTransform::FilterInsignificant(suffixes) = stage {
                suffixes.clone_from(&self.insignificant_suffixes);
            }
        }
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = ChunkerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ChunkerConfig::default());
        assert_eq!(config.transform_pipeline().unwrap(), TransformPipeline::default());
    }

    #[test]
    fn test_partial_json() {
        let config = ChunkerConfig::from_json_str(
            r#"{"tagger_classes": ["unigram", {"ngram": 4}], "chunker": "classifier", "cutoff": 1}"#,
        )
        .unwrap();
        assert_eq!(config.tagger_classes, vec![TaggerClass::Unigram, TaggerClass::Ngram(4)]);
        assert_eq!(config.chunker, ChunkerKind::Classifier);
        assert_eq!(config.cutoff, 1);
        assert_eq!(config.default_tag, "NN");
    }

    #[test]
    fn test_affix_class_from_json() {
        let config =
            ChunkerConfig::from_json_str(r#"{"tagger_classes": [{"affix": {"affix_length": 2, "min_stem_length": 1}}]}"#)
                .unwrap();
        assert_eq!(
            config.tagger_classes,
            vec![TaggerClass::Affix {
                affix_length: 2,
                min_stem_length: 1
            }]
        );
    }

    #[test]
    fn test_unknown_stage_is_config_error() {
        let err = ChunkerConfig::from_json_str(r#"{"transforms": ["swap_verb_phrase", "uppercase"]}"#).unwrap_err();
        assert!(matches!(err, ChunkError::Config(msg) if msg.contains("uppercase")));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        assert!(matches!(
            ChunkerConfig::from_reader("{not json".as_bytes()),
            Err(ChunkError::Config(_))
        ));
    }

    #[test]
    fn test_explicit_stages_keep_custom_suffixes() {
        let config = ChunkerConfig::from_json_str(r#"{"insignificant_suffixes": ["PRP", "PRP$"]}"#).unwrap();
        let pipeline = config
            .transform_pipeline_for(&["filter_insignificant", "correct_verbs"])
            .unwrap();
        assert_eq!(
            pipeline.stages[0],
            ChunkTransform::FilterInsignificant(vec!["PRP".to_string(), "PRP$".to_string()])
        );
        assert!(config.transform_pipeline_for(&["nope"]).is_err());
    }

    #[test]
    fn test_custom_suffixes_reach_filter_stage() {
        let config = ChunkerConfig::from_json_str(r#"{"insignificant_suffixes": ["DT"], "transforms": ["filter_insignificant"]}"#)
            .unwrap();
        let pipeline = config.transform_pipeline().unwrap();
        assert_eq!(
            pipeline.stages,
            vec![ChunkTransform::FilterInsignificant(vec!["DT".to_string()])]
        );
    }
}
