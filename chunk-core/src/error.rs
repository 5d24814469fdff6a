//! # Erros do chunk-core
//!
//! Apenas operações estruturais falham: codificar uma árvore aninhada demais
//! em IOB, ler um rótulo IOB malformado ou carregar uma configuração inválida.
//! Parsing e transformações são funções totais e nunca retornam erro.

use thiserror::Error;

/// Erros estruturais e de configuração.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// Um chunk contém outra subárvore; é preciso achatar a árvore antes
    /// (ver [`crate::tree::flatten_deeptree`]).
    #[error("tree too deeply nested for flat IOB encoding: chunk '{label}' contains a subtree")]
    TooDeeplyNested { label: String },

    /// Folha sem tag (estilo treebank) encontrada onde se esperava `(palavra, tag)`.
    #[error("untagged leaf '{word}' cannot be encoded as an IOB triple")]
    UntaggedLeaf { word: String },

    /// Rótulo que não é `B-TIPO`, `I-TIPO` nem `O`.
    #[error("bad IOB label {0:?}")]
    BadIobLabel(String),

    /// Notação de colchetes inválida ao ler uma árvore.
    #[error("malformed bracketed tree: {0}")]
    BadTree(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Falha relatada por um evento `Error` do pipeline.
    #[error("pipeline failed: {0}")]
    Pipeline(String),
}

pub type Result<T> = std::result::Result<T, ChunkError>;
