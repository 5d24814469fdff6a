//! # Chunkers
//!
//! Um chunker recebe uma sentença etiquetada `(palavra, tag POS)` e devolve
//! uma [`ChunkTree`] rasa. Todos compartilham o trait [`ChunkParser`]:
//!
//! | Chunker               | Estratégia                                         |
//! |-----------------------|----------------------------------------------------|
//! | [`TagChunker`]        | cadeia de backoff de n-gramas sobre tags POS        |
//! | [`ClassifierChunker`] | classificador sobre features da janela + IOB prévio |
//! | [`PersonChunker`]     | lista de nomes próprios                            |
//! | [`LocationChunker`]   | gazetteer de locais (multi-palavra)                |
//!
//! Entrada vazia devolve `None` ("sem parse"). Rótulos previstos inválidos
//! são lidos como `O`.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::backoff::{backoff_tagger_with_cutoff, BackoffChain, Tagger};
use crate::classifier::{Classifier, ClassifierTagger, ClassifierTrainer};
use crate::error::Result;
use crate::features::FeatureDetector;
use crate::iob::{chunk_trees_to_train_chunks, conll_tag_chunks, iob_to_tree, ROOT_LABEL};
use crate::ngram::TaggerClass;
use crate::score::ChunkScore;
use crate::tagger::{IobLabel, IobTriple, TaggedToken};
use crate::tree::ChunkTree;

/// Tag POS usada quando o tagger não tem predição para uma palavra.
pub const FALLBACK_POS: &str = "NN";

/// Capacidade de chunking compartilhada por todos os chunkers.
pub trait ChunkParser: Send + Sync {
    /// Agrupa a sentença em chunks; `None` para entrada vazia.
    fn parse(&self, tagged: &[TaggedToken]) -> Option<ChunkTree>;

    /// Processa várias sentenças em paralelo, preservando a ordem.
    fn parse_sents(&self, sents: &[Vec<TaggedToken>]) -> Vec<Option<ChunkTree>> {
        sents.par_iter().map(|sent| self.parse(sent)).collect()
    }

    /// Re-analisa as folhas de cada árvore de referência e compara.
    ///
    /// Um parse `None` conta como todos os tokens fora de chunk.
    fn evaluate(&self, gold: &[ChunkTree]) -> ChunkScore {
        let sents: Vec<Vec<TaggedToken>> = gold.iter().map(ChunkTree::leaves).collect();
        let guesses = self.parse_sents(&sents);

        let mut score = ChunkScore::new();
        for ((tree, sent), guess) in gold.iter().zip(sents).zip(guesses) {
            let guess = guess.unwrap_or_else(|| ChunkTree::from_leaves(ROOT_LABEL, sent));
            score.score(tree, &guess);
        }
        debug!(sentences = gold.len(), f_measure = score.f_measure(), "chunker evaluated");
        score
    }
}

/// Interpreta a predição crua do tagger; ausente ou inválida vira `O`.
fn read_label(word: &str, raw: Option<&str>) -> IobLabel {
    match raw {
        None => IobLabel::Outside,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(word, label = raw, "predicted label is not valid IOB, reading as O");
            IobLabel::Outside
        }),
    }
}

fn build_tree<'a>(tagged: &[TaggedToken], labels: impl IntoIterator<Item = Option<&'a str>>) -> ChunkTree {
    let triples: Vec<IobTriple> = tagged
        .iter()
        .zip(labels)
        .map(|(t, raw)| IobTriple::new(t.word.clone(), t.tag.clone(), read_label(&t.word, raw)))
        .collect();
    iob_to_tree(&triples)
}

// ---------------------------------------------------------------------------
// TagChunker
// ---------------------------------------------------------------------------

/// Chunker por n-gramas: aprende a sequência `tag POS → rótulo IOB` com
/// uma cadeia de backoff, ignorando as palavras.
#[derive(Debug, Clone)]
pub struct TagChunker {
    chain: BackoffChain,
}

impl TagChunker {
    pub fn default_classes() -> Vec<TaggerClass> {
        vec![TaggerClass::Unigram, TaggerClass::Bigram]
    }

    pub fn train(trees: &[ChunkTree], classes: &[TaggerClass]) -> Result<Self> {
        Self::train_with_cutoff(trees, classes, 0)
    }

    pub fn train_with_cutoff(trees: &[ChunkTree], classes: &[TaggerClass], cutoff: usize) -> Result<Self> {
        let train_sents = conll_tag_chunks(trees)?;
        let chain = backoff_tagger_with_cutoff(&train_sents, classes, None, cutoff);
        debug!(chain = %chain.describe(), sentences = trees.len(), "tag chunker trained");
        Ok(Self { chain })
    }

    /// Usa uma cadeia já montada (as palavras vistas pela cadeia são tags POS).
    pub fn from_chain(chain: BackoffChain) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &BackoffChain {
        &self.chain
    }
}

impl ChunkParser for TagChunker {
    fn parse(&self, tagged: &[TaggedToken]) -> Option<ChunkTree> {
        if tagged.is_empty() {
            return None;
        }
        let tags: Vec<String> = tagged.iter().map(|t| t.tag.clone()).collect();
        let chunks = self.chain.tag(&tags);
        Some(build_tree(tagged, chunks.iter().map(Option::as_deref)))
    }
}

// ---------------------------------------------------------------------------
// ClassifierChunker
// ---------------------------------------------------------------------------

/// Chunker dirigido por classificador: cada posição é rotulada a partir das
/// features da janela e do rótulo previsto para a posição anterior.
#[derive(Debug, Clone)]
pub struct ClassifierChunker<M> {
    tagger: ClassifierTagger<M>,
}

impl<M: Classifier> ClassifierChunker<M> {
    pub fn train<T>(trees: &[ChunkTree], trainer: &T, detector: FeatureDetector) -> Result<Self>
    where
        T: ClassifierTrainer<Model = M>,
    {
        let train_chunks = chunk_trees_to_train_chunks(trees)?;
        Ok(Self {
            tagger: ClassifierTagger::train(&train_chunks, trainer, detector),
        })
    }

    pub fn from_model(model: M, detector: FeatureDetector) -> Self {
        Self {
            tagger: ClassifierTagger::from_model(model, detector),
        }
    }

    pub fn tagger(&self) -> &ClassifierTagger<M> {
        &self.tagger
    }
}

impl<M: Classifier> ChunkParser for ClassifierChunker<M> {
    fn parse(&self, tagged: &[TaggedToken]) -> Option<ChunkTree> {
        if tagged.is_empty() {
            return None;
        }
        let labels = self.tagger.tag(tagged);
        Some(build_tree(tagged, labels.iter().map(|l| Some(l.as_str()))))
    }
}

// ---------------------------------------------------------------------------
// Chunkers por regras
// ---------------------------------------------------------------------------

/// Agrupa sequências de nomes conhecidos em chunks `PERSON`.
#[derive(Debug, Clone, Default)]
pub struct PersonChunker {
    names: HashSet<String>,
}

impl PersonChunker {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ChunkParser for PersonChunker {
    fn parse(&self, tagged: &[TaggedToken]) -> Option<ChunkTree> {
        if tagged.is_empty() {
            return None;
        }
        let mut triples = Vec::with_capacity(tagged.len());
        let mut in_person = false;

        for t in tagged {
            let label = if !self.names.contains(&t.word) {
                in_person = false;
                IobLabel::Outside
            } else if in_person {
                IobLabel::Inside("PERSON".to_string())
            } else {
                in_person = true;
                IobLabel::Begin("PERSON".to_string())
            };
            triples.push(IobTriple::new(t.word.clone(), t.tag.clone(), label));
        }
        Some(iob_to_tree(&triples))
    }
}

/// Chunks `LOCATION` a partir de um gazetteer que pode ter entradas com
/// várias palavras ("San Francisco"). Locais adjacentes viram um único chunk.
#[derive(Debug, Clone, Default)]
pub struct LocationChunker {
    locations: HashSet<String>,
    /// Maior número de espaços em uma entrada do gazetteer.
    lookahead: usize,
}

impl LocationChunker {
    pub fn new<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let locations: HashSet<String> = locations.into_iter().map(Into::into).collect();
        let lookahead = locations
            .iter()
            .map(|loc| loc.matches(' ').count())
            .max()
            .unwrap_or(0);
        Self { locations, lookahead }
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Rotula a sentença; a entrada mais curta que casa em cada posição vence.
    pub fn iob_locations(&self, tagged: &[TaggedToken]) -> Vec<IobTriple> {
        let mut triples = Vec::with_capacity(tagged.len());
        let mut inside = false;
        let mut i = 0;

        while i < tagged.len() {
            let max_words = (self.lookahead + 1).min(tagged.len() - i);
            let matched = (1..=max_words).find(|&n| {
                let phrase = tagged[i..i + n]
                    .iter()
                    .map(|t| t.word.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                self.locations.contains(&phrase)
            });

            match matched {
                Some(n) => {
                    for (k, t) in tagged[i..i + n].iter().enumerate() {
                        let label = if k == 0 && !inside {
                            IobLabel::Begin("LOCATION".to_string())
                        } else {
                            IobLabel::Inside("LOCATION".to_string())
                        };
                        triples.push(IobTriple::new(t.word.clone(), t.tag.clone(), label));
                    }
                    inside = true;
                    i += n;
                }
                None => {
                    let t = &tagged[i];
                    triples.push(IobTriple::new(t.word.clone(), t.tag.clone(), IobLabel::Outside));
                    inside = false;
                    i += 1;
                }
            }
        }

        triples
    }
}

impl ChunkParser for LocationChunker {
    fn parse(&self, tagged: &[TaggedToken]) -> Option<ChunkTree> {
        if tagged.is_empty() {
            return None;
        }
        Some(iob_to_tree(&self.iob_locations(tagged)))
    }
}

/// Converte uma árvore de entidades (palavras soltas sob rótulos como
/// `PERSON`, `LOCATION`) em triplas IOB, etiquetando as palavras com `pos_tagger`.
///
/// Palavras penduradas direto na raiz ficam `O`. Sem predição de tag, usa [`FALLBACK_POS`].
pub fn entity_tree_to_iob(tree: &ChunkTree, pos_tagger: &dyn Tagger) -> Vec<IobTriple> {
    let pairs = tree.pos();
    let words: Vec<String> = pairs.iter().map(|p| p.word.clone()).collect();
    let tags = pos_tagger.tag(&words);

    let mut prev: Option<&str> = None;
    let mut triples = Vec::with_capacity(pairs.len());

    for (pair, tag) in pairs.iter().zip(tags) {
        let entity = pair.tag.as_str();
        let label = if entity == tree.label {
            prev = None;
            IobLabel::Outside
        } else if prev == Some(entity) {
            IobLabel::Inside(entity.to_string())
        } else {
            prev = Some(entity);
            IobLabel::Begin(entity.to_string())
        };
        let tag = tag.unwrap_or_else(|| FALLBACK_POS.to_string());
        triples.push(IobTriple::new(pair.word.clone(), tag, label));
    }

    triples
}
