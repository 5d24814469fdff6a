//! # chunk-core — Tagging com Backoff, Chunking IOB e Transformações de Chunks
//!
//! Este crate implementa um pipeline de chunking raso para inglês: etiquetagem
//! morfossintática com cadeias de backoff, agrupamento de tokens em chunks
//! (frases nominais, pessoas, locais) e reescrita dos chunks encontrados.
//!
//! ## Arquitetura do Sistema
//!
//! 1.  **Entrada**: Texto bruto (String).
//! 2.  **Tokenização** ([`tokenizer`]): fronteiras de palavra Unicode, com offsets.
//! 3.  **POS** ([`backoff`], [`ngram`]): cadeia de taggers onde o último
//!     construído responde primeiro e os anteriores servem de backoff.
//! 4.  **Chunking** ([`chunkers`]): por n-gramas de tags ([`chunkers::TagChunker`]),
//!     por classificador ([`chunkers::ClassifierChunker`] + [`perceptron`]) ou por
//!     regras (pessoas e locais). A ponte [`iob`] converte entre árvores e triplas.
//! 5.  **Transformações** ([`transforms`]): normalização de frases nominais.
//! 6.  **Saída**: [`pipeline::Analysis`] com árvores, triplas IOB e chunks transformados.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use chunk_core::{ChunkPipeline, TaggedToken, TransformPipeline};
//!
//! // 1. Treina o pipeline padrão no corpus embutido
//! let pipeline = ChunkPipeline::new().unwrap();
//!
//! // 2. Analisa um texto
//! let analysis = pipeline.analyze("The book of recipes is delicious.").unwrap();
//! for tree in &analysis.trees {
//!     println!("{tree}");
//! }
//!
//! // 3. Transforma um chunk isolado
//! let chunk: Vec<TaggedToken> = chunk_core::tagger::tagged(&[
//!     ("the", "DT"), ("book", "NN"), ("of", "IN"),
//!     ("recipes", "NNS"), ("is", "VBZ"), ("delicious", "JJ"),
//! ]);
//! let out = TransformPipeline::default().run(&chunk);
//! assert_eq!(out[0].word, "delicious");
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: Orquestrador principal que conecta todos os estágios.
//! - [`iob`]: Bridge entre árvores de chunks e triplas CoNLL.
//! - [`score`]: Avaliação de chunkers (precisão, recall, F-measure).
//! - [`corpus`]: Dados de treinamento anotados (IOB).
//! - [`config`]: Configuração carregada de JSON.

pub mod backoff;
pub mod chunkers;
pub mod classifier;
pub mod config;
pub mod corpus;
pub mod error;
pub mod features;
pub mod iob;
pub mod ngram;
pub mod perceptron;
pub mod pipeline;
pub mod score;
pub mod tagger;
pub mod tokenizer;
pub mod transforms;
pub mod tree;

pub use backoff::{backoff_tagger, BackoffChain, Tagger};
pub use chunkers::{ChunkParser, ClassifierChunker, LocationChunker, PersonChunker, TagChunker};
pub use config::{ChunkerConfig, ChunkerKind};
pub use error::{ChunkError, Result};
pub use ngram::TaggerClass;
pub use pipeline::{Analysis, ChunkPipeline, PipelineEvent};
pub use tagger::{IobLabel, IobTriple, TaggedToken};
pub use transforms::{ChunkTransform, TransformEvent, TransformPipeline};
pub use tree::{ChunkTree, Node};
