//! # Pipeline de Chunking com Eventos Observáveis
//!
//! O pipeline coordena os módulos (tokenizador, cadeia de POS, chunker,
//! transformações) e emite eventos em cada passo via um canal Rust (`mpsc`),
//! permitindo que o servidor WebSocket transmita o progresso em tempo real.
//!
//! ```text
//! texto ─► tokenize ─► cadeia de POS ─► chunker ─► transforma cada NP
//!            │              │              │              │
//!   TokenizationDone    PosTagged     ChunkTagged   TransformApplied ─► Done
//! ```

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backoff::{backoff_tagger_with_cutoff, BackoffChain, Tagger};
use crate::chunkers::{ChunkParser, ClassifierChunker, TagChunker};
use crate::config::{ChunkerConfig, ChunkerKind};
use crate::corpus;
use crate::error::{ChunkError, Result};
use crate::features::prev_next_pos_iob;
use crate::iob::tree_to_iob;
use crate::ngram::{default_patterns, DefaultTagger, RegexpTagger};
use crate::perceptron::AveragedPerceptron;
use crate::tagger::{IobTriple, TaggedToken};
use crate::tokenizer::{tokenize, Token};
use crate::transforms::{chunk_tree_to_sent, TransformEvent, TransformPipeline};
use crate::tree::{ChunkTree, Node};

/// Tokens que encerram uma sentença.
const SENTENCE_END: &[&str] = &[".", "?", "!"];

/// Rótulo dos chunks que passam pelas transformações.
const TRANSFORM_LABEL: &str = "NP";

/// Um chunk `NP` antes e depois das transformações.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformedChunk {
    pub sentence: usize,
    pub original: Vec<TaggedToken>,
    pub transformed: Vec<TaggedToken>,
}

/// Resultado consolidado de uma análise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub tagged: Vec<TaggedToken>,
    /// Uma árvore por sentença.
    pub trees: Vec<ChunkTree>,
    pub triples: Vec<IobTriple>,
    pub chunks: Vec<TransformedChunk>,
    /// Texto de cada sentença reconstruído a partir da árvore.
    pub sentences: Vec<String>,
    pub processing_ms: u64,
}

/// Eventos emitidos pelo pipeline durante o processamento.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: Tokenização concluída.
    TokenizationDone { tokens: Vec<Token>, total: usize },
    /// **Passo 2**: Tags POS atribuídas pela cadeia de backoff.
    PosTagged {
        tagged: Vec<TaggedToken>,
        /// Taggers na ordem de resolução.
        chain: Vec<String>,
    },
    /// **Passo 3**: Uma sentença foi agrupada em chunks.
    ChunkTagged {
        sentence: usize,
        triples: Vec<IobTriple>,
        tree: String,
    },
    /// **Passo 4**: Um estágio de transformação foi aplicado a um chunk.
    TransformApplied {
        sentence: usize,
        chunk_index: usize,
        stage: String,
        chunk: Vec<TaggedToken>,
    },
    /// **Conclusão**
    Done { analysis: Analysis },
    /// **Falha**: Ocorreu um erro irrecuperável.
    Error { message: String },
}

/// O pipeline de chunking principal.
///
/// Os modelos são treinados uma vez na construção e depois só lidos, então
/// o pipeline pode ser compartilhado entre threads (ex: atrás de um `Arc`).
pub struct ChunkPipeline {
    config: ChunkerConfig,
    pos_tagger: BackoffChain,
    chunker: Arc<dyn ChunkParser>,
    transforms: TransformPipeline,
}

impl ChunkPipeline {
    /// Configuração padrão treinada no corpus embutido.
    pub fn new() -> Result<Self> {
        Self::from_config(ChunkerConfig::default())
    }

    pub fn from_config(config: ChunkerConfig) -> Result<Self> {
        Self::train(config, &corpus::chunked_sents())
    }

    /// Treina a cadeia de POS e o chunker sobre `chunked_sents`.
    pub fn train(config: ChunkerConfig, chunked_sents: &[ChunkTree]) -> Result<Self> {
        config.validate()?;
        let start = Instant::now();

        let tagged_sents: Vec<Vec<TaggedToken>> = chunked_sents.iter().map(ChunkTree::leaves).collect();
        let fallback = BackoffChain::from_tagger(DefaultTagger::new(config.default_tag.clone()))
            .with_front(Arc::new(RegexpTagger::new(&default_patterns())?));
        let pos_tagger = backoff_tagger_with_cutoff(&tagged_sents, &config.tagger_classes, Some(fallback), config.cutoff);

        let chunker: Arc<dyn ChunkParser> = match config.chunker {
            ChunkerKind::Tag => Arc::new(TagChunker::train_with_cutoff(
                chunked_sents,
                &config.chunker_classes,
                config.cutoff,
            )?),
            ChunkerKind::Classifier => Arc::new(ClassifierChunker::train(
                chunked_sents,
                &AveragedPerceptron::new(config.perceptron_iterations),
                prev_next_pos_iob,
            )?),
        };

        let transforms = config.transform_pipeline()?;
        info!(
            pos_chain = %pos_tagger.describe(),
            chunker = ?config.chunker,
            sentences = chunked_sents.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "chunk pipeline trained"
        );

        Ok(Self {
            config,
            pos_tagger,
            chunker,
            transforms,
        })
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    pub fn pos_tagger(&self) -> &BackoffChain {
        &self.pos_tagger
    }

    pub fn chunker(&self) -> &dyn ChunkParser {
        self.chunker.as_ref()
    }

    pub fn transforms(&self) -> &TransformPipeline {
        &self.transforms
    }

    /// Etiqueta palavras com a cadeia de POS; sem predição usa `default_tag`.
    pub fn pos_tag(&self, words: &[String]) -> Vec<TaggedToken> {
        words
            .iter()
            .zip(self.pos_tagger.tag(words))
            .map(|(w, tag)| TaggedToken::new(w.clone(), tag.unwrap_or_else(|| self.config.default_tag.clone())))
            .collect()
    }

    /// Processa o texto de forma síncrona e retorna o resultado final.
    pub fn analyze(&self, text: &str) -> Result<Analysis> {
        let (tx, rx) = mpsc::channel();
        self.analyze_streaming(text, tx);

        // Consome todos os eventos até o fim
        let mut result = Err(ChunkError::Pipeline("pipeline finished without result".to_string()));
        while let Ok(event) = rx.recv() {
            match event {
                PipelineEvent::Done { analysis } => result = Ok(analysis),
                PipelineEvent::Error { message } => result = Err(ChunkError::Pipeline(message)),
                _ => {}
            }
        }
        result
    }

    /// Executa o pipeline enviando eventos de progresso em tempo real.
    ///
    /// # Fluxo de Eventos
    /// 1. `TokenizationDone`
    /// 2. `PosTagged`
    /// 3. `ChunkTagged` (uma por sentença)
    /// 4. `TransformApplied` (por estágio e chunk `NP`, se `trace_transforms`)
    /// 5. `Done` ou `Error`
    pub fn analyze_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        let start = Instant::now();
        match self.run(text, &tx) {
            Ok(mut analysis) => {
                analysis.processing_ms = start.elapsed().as_millis() as u64;
                let _ = tx.send(PipelineEvent::Done { analysis });
            }
            Err(e) => {
                let _ = tx.send(PipelineEvent::Error { message: e.to_string() });
            }
        }
    }

    fn run(&self, text: &str, tx: &mpsc::Sender<PipelineEvent>) -> Result<Analysis> {
        // === Passo 1: Tokenização ===
        let tokens = tokenize(text);
        let _ = tx.send(PipelineEvent::TokenizationDone {
            tokens: tokens.clone(),
            total: tokens.len(),
        });
        if tokens.is_empty() {
            return Ok(Analysis::default());
        }

        // === Passo 2: POS ===
        let words: Vec<String> = tokens.into_iter().map(|t| t.text).collect();
        let tagged = self.pos_tag(&words);
        let _ = tx.send(PipelineEvent::PosTagged {
            tagged: tagged.clone(),
            chain: self.pos_tagger.resolution_order(),
        });

        // === Passo 3: Chunking (sentenças em paralelo) ===
        let sents = split_sentences(&tagged);
        let trees: Vec<ChunkTree> = self
            .chunker
            .parse_sents(&sents)
            .into_iter()
            .zip(&sents)
            .map(|(tree, sent)| tree.unwrap_or_else(|| ChunkTree::from_leaves(crate::iob::ROOT_LABEL, sent.clone())))
            .collect();

        let mut analysis = Analysis {
            tagged,
            ..Analysis::default()
        };

        for (sentence, tree) in trees.iter().enumerate() {
            let triples = tree_to_iob(tree)?;
            let _ = tx.send(PipelineEvent::ChunkTagged {
                sentence,
                triples: triples.clone(),
                tree: tree.to_string(),
            });
            analysis.triples.extend(triples);
            analysis.sentences.push(chunk_tree_to_sent(tree, " "));

            // === Passo 4: Transformações ===
            let chunks = tree.children.iter().filter_map(|child| match child {
                Node::Tree(chunk) if chunk.label == TRANSFORM_LABEL => Some(chunk.leaves()),
                _ => None,
            });
            for (chunk_index, original) in chunks.enumerate() {
                let transformed = self.transform_chunk(&original, sentence, chunk_index, tx);
                analysis.chunks.push(TransformedChunk {
                    sentence,
                    original,
                    transformed,
                });
            }
        }
        debug!(
            sentences = trees.len(),
            chunks = analysis.chunks.len(),
            "text analyzed"
        );

        analysis.trees = trees;
        Ok(analysis)
    }

    fn transform_chunk(
        &self,
        chunk: &[TaggedToken],
        sentence: usize,
        chunk_index: usize,
        tx: &mpsc::Sender<PipelineEvent>,
    ) -> Vec<TaggedToken> {
        if !self.config.trace_transforms {
            return self.transforms.run(chunk);
        }

        let (stage_tx, stage_rx) = mpsc::channel();
        let transformed = self.transforms.run_traced(chunk, &stage_tx);
        drop(stage_tx);

        for TransformEvent::StageApplied { stage, chunk } in stage_rx {
            let _ = tx.send(PipelineEvent::TransformApplied {
                sentence,
                chunk_index,
                stage,
                chunk,
            });
        }
        transformed
    }
}

/// Divide a sequência em sentenças; o ponto final fica com a sentença.
fn split_sentences(tagged: &[TaggedToken]) -> Vec<Vec<TaggedToken>> {
    let mut sents = Vec::new();
    let mut current = Vec::new();
    for token in tagged {
        current.push(token.clone());
        if SENTENCE_END.contains(&token.word.as_str()) {
            sents.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        sents.push(current);
    }
    sents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::tagged;

    fn pipeline() -> ChunkPipeline {
        ChunkPipeline::new().unwrap()
    }

    #[test]
    fn test_pipeline_basic() {
        let analysis = pipeline().analyze("The book of recipes is delicious.").unwrap();
        assert_eq!(analysis.tagged.len(), 7);
        assert_eq!(analysis.trees.len(), 1);
        assert_eq!(analysis.triples.len(), 7);
        assert!(!analysis.chunks.is_empty());
        assert_eq!(analysis.sentences[0], "The book of recipes is delicious.");
    }

    #[test]
    fn test_pipeline_empty() {
        let analysis = pipeline().analyze("").unwrap();
        assert!(analysis.tagged.is_empty());
        assert!(analysis.trees.is_empty());
    }

    #[test]
    fn test_unknown_words_fall_back() {
        let p = pipeline();
        let tagged = p.pos_tag(&["zyzzyva".to_string(), "42".to_string(), "running".to_string()]);
        assert_eq!(tagged[0].tag, "NN");
        assert_eq!(tagged[1].tag, "CD");
        assert_eq!(tagged[2].tag, "VBG");
    }

    #[test]
    fn test_pipeline_events_streaming() {
        let p = pipeline();
        let (tx, rx) = mpsc::channel();
        p.analyze_streaming("The home team won the final game. Fans filled the stadium.", tx);

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(matches!(&events[0], PipelineEvent::TokenizationDone { .. }));
        assert!(matches!(&events[1], PipelineEvent::PosTagged { .. }));

        let chunk_tagged = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::ChunkTagged { .. }))
            .count();
        assert_eq!(chunk_tagged, 2);
        assert!(events.iter().any(|e| matches!(e, PipelineEvent::TransformApplied { .. })));
        assert!(matches!(events.last(), Some(PipelineEvent::Done { .. })));
    }

    #[test]
    fn test_trace_transforms_off_emits_no_stage_events() {
        let config = ChunkerConfig {
            trace_transforms: false,
            ..ChunkerConfig::default()
        };
        let p = ChunkPipeline::from_config(config).unwrap();
        let (tx, rx) = mpsc::channel();
        p.analyze_streaming("The book was great.", tx);
        assert!(!rx
            .try_iter()
            .any(|e| matches!(e, PipelineEvent::TransformApplied { .. })));
    }

    #[test]
    fn test_split_sentences() {
        let sents = split_sentences(&tagged(&[("a", "DT"), (".", "."), ("b", "NN")]));
        assert_eq!(sents.len(), 2);
        assert_eq!(sents[0].len(), 2);
    }

    #[test]
    fn test_classifier_pipeline() {
        let config = ChunkerConfig {
            chunker: ChunkerKind::Classifier,
            ..ChunkerConfig::default()
        };
        let analysis = ChunkPipeline::from_config(config)
            .unwrap()
            .analyze("The chef added fresh herbs.")
            .unwrap();
        assert_eq!(analysis.trees.len(), 1);
        assert_eq!(analysis.trees[0].leaves(), analysis.tagged);
    }
}
