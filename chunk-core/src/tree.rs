//! # Árvores de Chunks
//!
//! Uma [`ChunkTree`] é uma árvore ordenada com raiz rotulada (normalmente `S`).
//! Os nós internos carregam um rótulo (tipo do chunk) e as folhas são tokens
//! etiquetados:
//!
//! ```text
//! (S (NP the/DT book/NN) has/VBZ (NP many/JJ chapters/NNS))
//! ```
//!
//! Árvores no estilo treebank também aparecem como entrada, com pré-terminais
//! do tipo `(NNP Pierre)`: a palavra fica solta ([`Node::Word`]) e a tag é o
//! rótulo do pai. [`flatten_deeptree`] e [`shallow_tree`] convertem essas
//! árvores profundas para a forma rasa que o bridge IOB aceita.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChunkError;
use crate::tagger::TaggedToken;

/// Filho de uma árvore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Folha `(palavra, tag)`.
    Leaf(TaggedToken),
    /// Subárvore rotulada.
    Tree(ChunkTree),
    /// Palavra sem tag, filha de um pré-terminal treebank.
    Word(String),
}

impl Node {
    fn height(&self) -> usize {
        match self {
            Node::Tree(t) => t.height(),
            Node::Leaf(_) | Node::Word(_) => 1,
        }
    }
}

impl From<TaggedToken> for Node {
    fn from(token: TaggedToken) -> Self {
        Node::Leaf(token)
    }
}

impl From<ChunkTree> for Node {
    fn from(tree: ChunkTree) -> Self {
        Node::Tree(tree)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkTree {
    pub label: String,
    pub children: Vec<Node>,
}

impl ChunkTree {
    pub fn new(label: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    /// Árvore cujos filhos são todos folhas.
    pub fn from_leaves(label: impl Into<String>, leaves: impl IntoIterator<Item = TaggedToken>) -> Self {
        Self::new(label, leaves.into_iter().map(Node::Leaf).collect())
    }

    /// Altura no sentido treebank: uma árvore só de folhas tem altura 2.
    pub fn height(&self) -> usize {
        1 + self.children.iter().map(Node::height).max().unwrap_or(0)
    }

    /// Folhas etiquetadas em ordem de documento.
    pub fn leaves(&self) -> Vec<TaggedToken> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<TaggedToken>) {
        for child in &self.children {
            match child {
                Node::Leaf(t) => out.push(t.clone()),
                Node::Tree(t) => t.collect_leaves(out),
                Node::Word(_) => {}
            }
        }
    }

    /// Pares `(palavra, tag)`; palavras soltas recebem o rótulo do pai como tag.
    pub fn pos(&self) -> Vec<TaggedToken> {
        let mut out = Vec::new();
        self.collect_pos(&mut out);
        out
    }

    fn collect_pos(&self, out: &mut Vec<TaggedToken>) {
        for child in &self.children {
            match child {
                Node::Leaf(t) => out.push(t.clone()),
                Node::Word(w) => out.push(TaggedToken::new(w.clone(), self.label.clone())),
                Node::Tree(t) => t.collect_pos(out),
            }
        }
    }

    /// Todas as subárvores (incluindo a própria) que satisfazem `pred`, em pré-ordem.
    pub fn subtrees<'a>(&'a self, pred: &dyn Fn(&ChunkTree) -> bool) -> Vec<&'a ChunkTree> {
        let mut out = Vec::new();
        self.collect_subtrees(pred, &mut out);
        out
    }

    fn collect_subtrees<'a>(&'a self, pred: &dyn Fn(&ChunkTree) -> bool, out: &mut Vec<&'a ChunkTree>) {
        if pred(self) {
            out.push(self);
        }
        for child in &self.children {
            if let Node::Tree(t) = child {
                t.collect_subtrees(pred, out);
            }
        }
    }
}

/// Folhas de cada subárvore com o rótulo dado.
pub fn sub_leaves(tree: &ChunkTree, label: &str) -> Vec<Vec<TaggedToken>> {
    tree.subtrees(&|t| t.label == label)
        .into_iter()
        .map(ChunkTree::leaves)
        .collect()
}

/// Parênteses dentro de átomos seguem a convenção treebank (`-LRB-`, `-RRB-`).
fn escape_atom(atom: &str) -> String {
    atom.replace('(', "-LRB-").replace(')', "-RRB-")
}

fn unescape_atom(atom: &str) -> String {
    atom.replace("-LRB-", "(").replace("-RRB-", ")")
}

impl fmt::Display for ChunkTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", escape_atom(&self.label))?;
        for child in &self.children {
            match child {
                Node::Leaf(t) => write!(f, " {}/{}", escape_atom(&t.word), escape_atom(&t.tag))?,
                Node::Tree(t) => write!(f, " {t}")?,
                Node::Word(w) => write!(f, " {}", escape_atom(w))?,
            }
        }
        write!(f, ")")
    }
}

/// Lê a notação de colchetes produzida por `Display`.
///
/// Átomos com `/` viram folhas `palavra/tag` (a última barra separa a tag);
/// átomos sem `/` viram palavras soltas. `-LRB-`/`-RRB-` voltam a ser
/// parênteses. Palavras com espaços em branco não têm representação: o
/// tokenizador nunca as produz.
impl FromStr for ChunkTree {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = lex(s);
        let mut pos = 0;
        let tree = parse_tree(&tokens, &mut pos)?;
        if pos != tokens.len() {
            return Err(ChunkError::BadTree(format!("trailing input after position {pos}")));
        }
        Ok(tree)
    }
}

fn lex(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in s.chars() {
        match ch {
            '(' | ')' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(ch.to_string());
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_tree(tokens: &[String], pos: &mut usize) -> Result<ChunkTree, ChunkError> {
    if tokens.get(*pos).map(String::as_str) != Some("(") {
        return Err(ChunkError::BadTree(format!("expected '(' at position {pos}")));
    }
    *pos += 1;
    let label = match tokens.get(*pos) {
        Some(t) if t != "(" && t != ")" => unescape_atom(t),
        _ => return Err(ChunkError::BadTree(format!("missing label at position {pos}"))),
    };
    *pos += 1;

    let mut children = Vec::new();
    loop {
        match tokens.get(*pos).map(String::as_str) {
            None => return Err(ChunkError::BadTree("unbalanced parentheses".to_string())),
            Some(")") => {
                *pos += 1;
                return Ok(ChunkTree::new(label, children));
            }
            Some("(") => children.push(Node::Tree(parse_tree(tokens, pos)?)),
            Some(atom) => {
                children.push(match atom.rsplit_once('/') {
                    Some((word, tag)) if !word.is_empty() => {
                        Node::Leaf(TaggedToken::new(unescape_atom(word), unescape_atom(tag)))
                    }
                    _ => Node::Word(unescape_atom(atom)),
                });
                *pos += 1;
            }
        }
    }
}

fn flatten_childtrees(children: &[Node]) -> Vec<Node> {
    let mut out = Vec::new();
    for child in children {
        match child {
            Node::Tree(t) if t.height() < 3 => out.extend(t.pos().into_iter().map(Node::Leaf)),
            Node::Tree(t) if t.height() == 3 => out.push(Node::Tree(ChunkTree::from_leaves(t.label.clone(), t.pos()))),
            Node::Tree(t) => out.extend(flatten_childtrees(&t.children)),
            other => out.push(other.clone()),
        }
    }
    out
}

/// Achata uma árvore profunda mantendo apenas os chunks mais baixos
/// (subárvores de altura 3, como `NP` sobre pré-terminais).
pub fn flatten_deeptree(tree: &ChunkTree) -> ChunkTree {
    ChunkTree::new(tree.label.clone(), flatten_childtrees(&tree.children))
}

/// Mantém apenas os filhos de primeiro nível da raiz como chunks, com todas
/// as folhas de cada um.
pub fn shallow_tree(tree: &ChunkTree) -> ChunkTree {
    let mut children = Vec::new();
    for child in &tree.children {
        match child {
            Node::Tree(t) if t.height() < 3 => children.extend(t.pos().into_iter().map(Node::Leaf)),
            Node::Tree(t) => children.push(Node::Tree(ChunkTree::from_leaves(t.label.clone(), t.pos()))),
            other => children.push(other.clone()),
        }
    }
    ChunkTree::new(tree.label.clone(), children)
}

/// Renomeia rótulos (em todos os níveis) segundo `mapping`.
pub fn convert_tree_labels(tree: &ChunkTree, mapping: &HashMap<String, String>) -> ChunkTree {
    let children = tree
        .children
        .iter()
        .map(|child| match child {
            Node::Tree(t) => Node::Tree(convert_tree_labels(t, mapping)),
            other => other.clone(),
        })
        .collect();
    let label = mapping.get(&tree.label).cloned().unwrap_or_else(|| tree.label.clone());
    ChunkTree::new(label, children)
}
