//! # Bridge IOB: Árvore ↔ Triplas CoNLL
//!
//! Converte entre uma [`ChunkTree`] rasa (um nível de chunks sob a raiz) e a
//! sequência plana de triplas `(palavra, tag, rótulo IOB)`.
//!
//! ```text
//! (S (NP the/DT book/NN) has/VBZ)
//!        ⇅
//! the DT B-NP | book NN I-NP | has VBZ O
//! ```
//!
//! Lei de ida e volta: `iob_to_tree(tree_to_iob(t)?) == t` para toda árvore
//! com no máximo um nível de chunks e sem chunks vazios.

use crate::error::{ChunkError, Result};
use crate::tagger::{IobLabel, IobTriple, TaggedToken};
use crate::tree::{ChunkTree, Node};

/// Rótulo de raiz usado pelos chunkers.
pub const ROOT_LABEL: &str = "S";

/// Codifica a árvore em triplas IOB, em ordem de documento.
///
/// # Erros
/// - [`ChunkError::TooDeeplyNested`] se um chunk contém outra subárvore;
///   achate a árvore antes ([`crate::tree::flatten_deeptree`]).
/// - [`ChunkError::UntaggedLeaf`] se encontrar uma palavra sem tag.
pub fn tree_to_iob(tree: &ChunkTree) -> Result<Vec<IobTriple>> {
    let mut triples = Vec::new();

    for child in &tree.children {
        match child {
            Node::Leaf(t) => triples.push(IobTriple::new(t.word.clone(), t.tag.clone(), IobLabel::Outside)),
            Node::Word(w) => return Err(ChunkError::UntaggedLeaf { word: w.clone() }),
            Node::Tree(chunk) => {
                for (i, grandchild) in chunk.children.iter().enumerate() {
                    let t = match grandchild {
                        Node::Leaf(t) => t,
                        Node::Tree(_) => {
                            return Err(ChunkError::TooDeeplyNested {
                                label: chunk.label.clone(),
                            })
                        }
                        Node::Word(w) => return Err(ChunkError::UntaggedLeaf { word: w.clone() }),
                    };
                    let label = if i == 0 {
                        IobLabel::Begin(chunk.label.clone())
                    } else {
                        IobLabel::Inside(chunk.label.clone())
                    };
                    triples.push(IobTriple::new(t.word.clone(), t.tag.clone(), label));
                }
            }
        }
    }

    Ok(triples)
}

/// Reconstrói a árvore (raiz `S`) a partir das triplas.
pub fn iob_to_tree(triples: &[IobTriple]) -> ChunkTree {
    iob_to_tree_with_root(triples, ROOT_LABEL)
}

/// Reconstrói a árvore com um rótulo de raiz arbitrário.
///
/// Máquina de estados com no máximo um chunk aberto:
/// - `B-X` fecha o chunk aberto e abre um novo do tipo X;
/// - `I-X` estende o chunk aberto se ele for do tipo X; caso contrário
///   (nenhum chunk aberto, ou tipo diferente) abre um novo chunk X;
/// - `O` fecha o chunk aberto e pendura a folha direto na raiz.
pub fn iob_to_tree_with_root(triples: &[IobTriple], root_label: &str) -> ChunkTree {
    let mut root = ChunkTree::new(root_label, Vec::new());
    let mut open: Option<ChunkTree> = None;

    for triple in triples {
        let leaf = Node::Leaf(triple.token());
        match &triple.label {
            IobLabel::Begin(kind) => {
                close_chunk(&mut root, &mut open);
                open = Some(ChunkTree::new(kind.clone(), vec![leaf]));
            }
            IobLabel::Inside(kind) => {
                let continues = open.as_ref().is_some_and(|chunk| chunk.label == *kind);
                match open.as_mut() {
                    Some(chunk) if continues => chunk.children.push(leaf),
                    _ => {
                        close_chunk(&mut root, &mut open);
                        open = Some(ChunkTree::new(kind.clone(), vec![leaf]));
                    }
                }
            }
            IobLabel::Outside => {
                close_chunk(&mut root, &mut open);
                root.children.push(leaf);
            }
        }
    }
    close_chunk(&mut root, &mut open);

    root
}

fn close_chunk(root: &mut ChunkTree, open: &mut Option<ChunkTree>) {
    if let Some(chunk) = open.take() {
        root.children.push(Node::Tree(chunk));
    }
}

/// Projeta cada árvore em pares `(tag POS, rótulo IOB)`, descartando as palavras.
///
/// O resultado é o corpus de treino do [`crate::chunkers::TagChunker`]: no
/// [`TaggedToken`] devolvido, `word` é a tag POS e `tag` é o rótulo IOB.
pub fn conll_tag_chunks(chunk_sents: &[ChunkTree]) -> Result<Vec<Vec<TaggedToken>>> {
    chunk_sents
        .iter()
        .map(|tree| {
            Ok(tree_to_iob(tree)?
                .into_iter()
                .map(|t| TaggedToken::new(t.tag, t.label.label()))
                .collect())
        })
        .collect()
}

/// Projeta cada árvore em pares `((palavra, tag), rótulo IOB)`.
pub fn chunk_trees_to_train_chunks(chunk_sents: &[ChunkTree]) -> Result<Vec<Vec<(TaggedToken, String)>>> {
    chunk_sents
        .iter()
        .map(|tree| {
            Ok(tree_to_iob(tree)?
                .into_iter()
                .map(|t| {
                    let label = t.label.label();
                    (TaggedToken::new(t.word, t.tag), label)
                })
                .collect())
        })
        .collect()
}
