//! # Transformações de Chunks
//!
//! Reescritas puras sobre um chunk `[(palavra, tag)]`, pensadas para
//! normalizar frases nominais: "the book of recipes is delicious" vira
//! "delicious recipe book".
//!
//! Cada estágio recebe e devolve uma sequência nova; a entrada nunca é
//! alterada. O [`TransformPipeline`] aplica uma lista de estágios em ordem
//! e pode emitir um [`TransformEvent`] por estágio via `mpsc`, do mesmo modo
//! que o pipeline de análise.

use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::Sender;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ChunkError;
use crate::tagger::{untag, TaggedToken};
use crate::tree::ChunkTree;

/// Sufixos de tag considerados insignificantes por padrão.
pub const DEFAULT_INSIGNIFICANT: &[&str] = &["DT", "CC"];

/// Primeiro índice `i` (a partir de `start`, andando `step`) tal que `pred(chunk[i])`.
///
/// `step` positivo anda para a direita até o fim; negativo anda para a
/// esquerda até o índice 0. Um `start` fora do chunk devolve `None`.
pub fn first_chunk_index<F>(chunk: &[TaggedToken], pred: F, start: isize, step: isize) -> Option<usize>
where
    F: Fn(&TaggedToken) -> bool,
{
    if step == 0 {
        return None;
    }
    let len = chunk.len() as isize;
    let mut i = start;
    while (0..len).contains(&i) {
        if pred(&chunk[i as usize]) {
            return Some(i as usize);
        }
        i += step;
    }
    None
}

fn tag_starts_with(prefix: &'static str) -> impl Fn(&TaggedToken) -> bool {
    move |t| t.tag.starts_with(prefix)
}

fn tag_equals(tag: &'static str) -> impl Fn(&TaggedToken) -> bool {
    move |t| t.tag == tag
}

/// Remove tokens cuja tag termina com algum dos `suffixes` (ex: `DT`, `PDT`, `CC`).
pub fn filter_insignificant<S: AsRef<str>>(chunk: &[TaggedToken], suffixes: &[S]) -> Vec<TaggedToken> {
    chunk
        .iter()
        .filter(|t| !suffixes.iter().any(|s| t.tag.ends_with(s.as_ref())))
        .cloned()
        .collect()
}

/// Verbo finito: começa com `VB`, tem mais de 2 caracteres e não é `VBG`.
/// Um `VB` puro não conta.
fn is_finite_verb(t: &TaggedToken) -> bool {
    t.tag != "VBG" && t.tag.starts_with("VB") && t.tag.len() > 2
}

/// Move o que vem depois do verbo para a frente e descarta o verbo.
///
/// `the book was great` → `great the book`
pub fn swap_verb_phrase(chunk: &[TaggedToken]) -> Vec<TaggedToken> {
    let Some(vbidx) = first_chunk_index(chunk, is_finite_verb, 0, 1) else {
        return chunk.to_vec();
    };
    chunk[vbidx + 1..].iter().chain(&chunk[..vbidx]).cloned().collect()
}

/// Move o complemento de uma preposição para antes do substantivo que a precede.
///
/// `book of recipes` → `recipes book`. A preposição `like` é ignorada.
pub fn swap_infinitive_phrase(chunk: &[TaggedToken]) -> Vec<TaggedToken> {
    let is_prep = |t: &TaggedToken| t.tag == "IN" && t.word != "like";
    let Some(inidx) = first_chunk_index(chunk, is_prep, 0, 1) else {
        return chunk.to_vec();
    };
    let nnidx = first_chunk_index(chunk, tag_starts_with("NN"), inidx as isize, -1).unwrap_or(0);

    chunk[..nnidx]
        .iter()
        .chain(&chunk[inidx + 1..])
        .chain(&chunk[nnidx..inidx])
        .cloned()
        .collect()
}

/// Singulariza o primeiro `NNS` seguido de outro substantivo.
///
/// `recipes/NNS book/NN` → `recipe/NN book/NN`
pub fn singularize_plural_noun(chunk: &[TaggedToken]) -> Vec<TaggedToken> {
    let mut out = chunk.to_vec();
    let Some(idx) = first_chunk_index(chunk, tag_equals("NNS"), 0, 1) else {
        return out;
    };
    if chunk.get(idx + 1).is_some_and(|next| next.tag.starts_with("NN")) {
        let t = &mut out[idx];
        t.word = t.word.trim_end_matches('s').to_string();
        t.tag = t.tag.trim_end_matches('S').to_string();
    }
    out
}

fn plural_verb_form(t: &TaggedToken) -> Option<TaggedToken> {
    match (t.word.as_str(), t.tag.as_str()) {
        ("is", "VBZ") => Some(TaggedToken::new("are", "VBP")),
        ("was", "VBD") => Some(TaggedToken::new("were", "VBD")),
        _ => None,
    }
}

fn singular_verb_form(t: &TaggedToken) -> Option<TaggedToken> {
    match (t.word.as_str(), t.tag.as_str()) {
        ("are", "VBP") => Some(TaggedToken::new("is", "VBZ")),
        ("were", "VBD") => Some(TaggedToken::new("was", "VBD")),
        _ => None,
    }
}

/// Concorda o primeiro verbo com o substantivo mais próximo (à direita
/// primeiro, depois à esquerda). Substantivo com tag terminada em `S` é plural.
pub fn correct_verbs(chunk: &[TaggedToken]) -> Vec<TaggedToken> {
    let mut out = chunk.to_vec();
    let Some(vbidx) = first_chunk_index(chunk, tag_starts_with("VB"), 0, 1) else {
        return out;
    };
    let is_noun = tag_starts_with("NN");
    let nnidx = first_chunk_index(chunk, &is_noun, vbidx as isize + 1, 1)
        .or_else(|| first_chunk_index(chunk, &is_noun, vbidx as isize - 1, -1));
    let Some(nnidx) = nnidx else {
        return out;
    };

    let verb = &chunk[vbidx];
    let corrected = if chunk[nnidx].tag.ends_with('S') {
        plural_verb_form(verb)
    } else {
        singular_verb_form(verb)
    };
    if let Some(form) = corrected {
        out[vbidx] = form;
    }
    out
}

/// Troca um cardinal que vem logo depois de um substantivo: `Dec./NNP 10/CD` → `10/CD Dec./NNP`.
pub fn swap_noun_cardinal(chunk: &[TaggedToken]) -> Vec<TaggedToken> {
    let mut out = chunk.to_vec();
    match first_chunk_index(chunk, tag_equals("CD"), 0, 1) {
        Some(cdidx) if cdidx > 0 && chunk[cdidx - 1].tag.starts_with("NN") => {
            out.swap(cdidx - 1, cdidx);
            out
        }
        _ => out,
    }
}

/// Um estágio nomeado de transformação.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkTransform {
    /// Filtra tags com os sufixos dados.
    FilterInsignificant(Vec<String>),
    SwapVerbPhrase,
    SwapInfinitivePhrase,
    SingularizePluralNoun,
    CorrectVerbs,
    SwapNounCardinal,
}

impl ChunkTransform {
    /// `filter_insignificant` com os sufixos padrão.
    pub fn filter_insignificant() -> Self {
        ChunkTransform::FilterInsignificant(DEFAULT_INSIGNIFICANT.iter().map(|s| s.to_string()).collect())
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChunkTransform::FilterInsignificant(_) => "filter_insignificant",
            ChunkTransform::SwapVerbPhrase => "swap_verb_phrase",
            ChunkTransform::SwapInfinitivePhrase => "swap_infinitive_phrase",
            ChunkTransform::SingularizePluralNoun => "singularize_plural_noun",
            ChunkTransform::CorrectVerbs => "correct_verbs",
            ChunkTransform::SwapNounCardinal => "swap_noun_cardinal",
        }
    }

    pub fn apply(&self, chunk: &[TaggedToken]) -> Vec<TaggedToken> {
        match self {
            ChunkTransform::FilterInsignificant(suffixes) => filter_insignificant(chunk, suffixes.as_slice()),
            ChunkTransform::SwapVerbPhrase => swap_verb_phrase(chunk),
            ChunkTransform::SwapInfinitivePhrase => swap_infinitive_phrase(chunk),
            ChunkTransform::SingularizePluralNoun => singularize_plural_noun(chunk),
            ChunkTransform::CorrectVerbs => correct_verbs(chunk),
            ChunkTransform::SwapNounCardinal => swap_noun_cardinal(chunk),
        }
    }
}

impl fmt::Display for ChunkTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lê o nome de um estágio; `filter_insignificant` usa os sufixos padrão.
impl FromStr for ChunkTransform {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "filter_insignificant" => Ok(ChunkTransform::filter_insignificant()),
            "swap_verb_phrase" => Ok(ChunkTransform::SwapVerbPhrase),
            "swap_infinitive_phrase" => Ok(ChunkTransform::SwapInfinitivePhrase),
            "singularize_plural_noun" => Ok(ChunkTransform::SingularizePluralNoun),
            "correct_verbs" => Ok(ChunkTransform::CorrectVerbs),
            "swap_noun_cardinal" => Ok(ChunkTransform::SwapNounCardinal),
            other => Err(ChunkError::Config(format!("unknown transform stage '{other}'"))),
        }
    }
}

/// Evento emitido após cada estágio de um [`TransformPipeline::run_traced`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TransformEvent {
    StageApplied { stage: String, chunk: Vec<TaggedToken> },
}

/// Sequência ordenada de estágios aplicada da esquerda para a direita.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformPipeline {
    pub stages: Vec<ChunkTransform>,
}

impl Default for TransformPipeline {
    fn default() -> Self {
        Self {
            stages: vec![
                ChunkTransform::filter_insignificant(),
                ChunkTransform::SwapVerbPhrase,
                ChunkTransform::SwapInfinitivePhrase,
                ChunkTransform::SingularizePluralNoun,
            ],
        }
    }
}

impl TransformPipeline {
    pub fn new(stages: Vec<ChunkTransform>) -> Self {
        Self { stages }
    }

    /// Monta a partir de nomes de estágio.
    ///
    /// # Erros
    /// [`ChunkError::Config`] para um nome desconhecido.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, ChunkError> {
        let stages = names
            .iter()
            .map(|n| n.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { stages })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(ChunkTransform::name).collect()
    }

    pub fn run(&self, chunk: &[TaggedToken]) -> Vec<TaggedToken> {
        self.stages.iter().fold(chunk.to_vec(), |acc, stage| {
            let next = stage.apply(&acc);
            trace!(stage = stage.name(), chunk = %render(&next), "transform stage");
            next
        })
    }

    /// Como [`run`](Self::run), enviando um evento após cada estágio.
    ///
    /// Um receptor já fechado não interrompe a transformação.
    pub fn run_traced(&self, chunk: &[TaggedToken], tx: &Sender<TransformEvent>) -> Vec<TaggedToken> {
        self.stages.iter().fold(chunk.to_vec(), |acc, stage| {
            let next = stage.apply(&acc);
            trace!(stage = stage.name(), chunk = %render(&next), "transform stage");
            let _ = tx.send(TransformEvent::StageApplied {
                stage: stage.name().to_string(),
                chunk: next.clone(),
            });
            next
        })
    }
}

fn render(chunk: &[TaggedToken]) -> String {
    chunk.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

fn punct_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s([,.;?])").expect("punctuation pattern is a valid regex"))
}

/// Junta as palavras da árvore com `concat`, colando a pontuação `, . ; ?`
/// na palavra anterior.
pub fn chunk_tree_to_sent(tree: &ChunkTree, concat: &str) -> String {
    let sentence = untag(&tree.leaves()).join(concat);
    punct_re().replace_all(&sentence, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::tagged;
    use std::sync::mpsc;

    #[test]
    fn test_filter_insignificant() {
        let chunk = tagged(&[("the", "DT"), ("terrible", "JJ"), ("movie", "NN")]);
        assert_eq!(
            filter_insignificant(&chunk, DEFAULT_INSIGNIFICANT),
            tagged(&[("terrible", "JJ"), ("movie", "NN")])
        );
        // sufixo, não igualdade
        let pdt = tagged(&[("all", "PDT"), ("movies", "NNS")]);
        assert_eq!(filter_insignificant(&pdt, &["DT"]), tagged(&[("movies", "NNS")]));

        let pronoun = tagged(&[("your", "PRP$"), ("book", "NN"), ("is", "VBZ"), ("great", "JJ")]);
        assert_eq!(
            filter_insignificant(&pronoun, &["PRP", "PRP$"]),
            tagged(&[("book", "NN"), ("is", "VBZ"), ("great", "JJ")])
        );
    }

    #[test]
    fn test_first_chunk_index() {
        let chunk = tagged(&[("61", "CD"), ("years", "NNS")]);
        assert_eq!(first_chunk_index(&chunk, tag_equals("CD"), 0, 1), Some(0));
        assert_eq!(first_chunk_index(&chunk, tag_equals("NNS"), 0, 1), Some(1));
        assert_eq!(first_chunk_index(&chunk, tag_equals("CD"), 1, -1), Some(0));
        assert_eq!(first_chunk_index(&chunk, tag_equals("VB"), 0, 1), None);
        assert_eq!(first_chunk_index(&chunk, tag_equals("CD"), -1, -1), None);
        assert_eq!(first_chunk_index(&chunk, tag_equals("CD"), 5, 1), None);
    }

    #[test]
    fn test_swap_verb_phrase() {
        assert_eq!(
            swap_verb_phrase(&tagged(&[("the", "DT"), ("book", "NN"), ("was", "VBD"), ("great", "JJ")])),
            tagged(&[("great", "JJ"), ("the", "DT"), ("book", "NN")])
        );
        assert_eq!(
            swap_verb_phrase(&tagged(&[
                ("this", "DT"),
                ("gripping", "VBG"),
                ("book", "NN"),
                ("is", "VBZ"),
                ("fantastic", "JJ"),
            ])),
            tagged(&[("fantastic", "JJ"), ("this", "DT"), ("gripping", "VBG"), ("book", "NN")])
        );
    }

    #[test]
    fn test_bare_vb_is_not_a_verb_phrase() {
        let chunk = tagged(&[("to", "TO"), ("go", "VB"), ("home", "NN")]);
        assert_eq!(swap_verb_phrase(&chunk), chunk);
    }

    #[test]
    fn test_swap_infinitive_phrase() {
        assert_eq!(
            swap_infinitive_phrase(&tagged(&[("book", "NN"), ("of", "IN"), ("recipes", "NNS")])),
            tagged(&[("recipes", "NNS"), ("book", "NN")])
        );
        let like = tagged(&[("tastes", "VBZ"), ("like", "IN"), ("chicken", "NN")]);
        assert_eq!(swap_infinitive_phrase(&like), like);
        assert_eq!(
            swap_infinitive_phrase(&tagged(&[
                ("delicious", "JJ"),
                ("book", "NN"),
                ("of", "IN"),
                ("recipes", "NNS"),
            ])),
            tagged(&[("delicious", "JJ"), ("recipes", "NNS"), ("book", "NN")])
        );
    }

    #[test]
    fn test_swap_infinitive_without_noun_uses_start() {
        let chunk = tagged(&[("big", "JJ"), ("of", "IN"), ("cake", "NN")]);
        assert_eq!(swap_infinitive_phrase(&chunk), tagged(&[("cake", "NN"), ("big", "JJ")]));
    }

    #[test]
    fn test_singularize_plural_noun() {
        assert_eq!(
            singularize_plural_noun(&tagged(&[("recipes", "NNS"), ("book", "NN")])),
            tagged(&[("recipe", "NN"), ("book", "NN")])
        );
        // todos os 's' finais saem
        assert_eq!(
            singularize_plural_noun(&tagged(&[("glass", "NNS"), ("maker", "NN")])),
            tagged(&[("gla", "NN"), ("maker", "NN")])
        );
        let alone = tagged(&[("recipes", "NNS")]);
        assert_eq!(singularize_plural_noun(&alone), alone);
    }

    #[test]
    fn test_singularize_only_looks_at_first_plural() {
        // o primeiro NNS é seguido de verbo: nada muda, mesmo com "cakes shop" adiante
        let chunk = tagged(&[("recipes", "NNS"), ("are", "VBP"), ("cakes", "NNS"), ("shop", "NN")]);
        assert_eq!(singularize_plural_noun(&chunk), chunk);
    }

    #[test]
    fn test_correct_verbs() {
        assert_eq!(
            correct_verbs(&tagged(&[("is", "VBZ"), ("our", "PRP$"), ("children", "NNS"), ("learning", "VBG")])),
            tagged(&[("are", "VBP"), ("our", "PRP$"), ("children", "NNS"), ("learning", "VBG")])
        );
        assert_eq!(
            correct_verbs(&tagged(&[("our", "PRP$"), ("children", "NNS"), ("is", "VBZ"), ("learning", "VBG")])),
            tagged(&[("our", "PRP$"), ("children", "NNS"), ("are", "VBP"), ("learning", "VBG")])
        );
        assert_eq!(
            correct_verbs(&tagged(&[("our", "PRP$"), ("child", "NN"), ("were", "VBD"), ("learning", "VBG")])),
            tagged(&[("our", "PRP$"), ("child", "NN"), ("was", "VBD"), ("learning", "VBG")])
        );
        let ok = tagged(&[("our", "PRP$"), ("child", "NN"), ("is", "VBZ"), ("learning", "VBG")]);
        assert_eq!(correct_verbs(&ok), ok);
    }

    #[test]
    fn test_swap_noun_cardinal() {
        assert_eq!(
            swap_noun_cardinal(&tagged(&[("Dec.", "NNP"), ("10", "CD")])),
            tagged(&[("10", "CD"), ("Dec.", "NNP")])
        );
        assert_eq!(
            swap_noun_cardinal(&tagged(&[("the", "DT"), ("top", "NN"), ("10", "CD")])),
            tagged(&[("the", "DT"), ("10", "CD"), ("top", "NN")])
        );
        let first = tagged(&[("10", "CD"), ("apples", "NNS")]);
        assert_eq!(swap_noun_cardinal(&first), first);
    }

    #[test]
    fn test_default_pipeline() {
        let chunk = tagged(&[
            ("the", "DT"),
            ("book", "NN"),
            ("of", "IN"),
            ("recipes", "NNS"),
            ("is", "VBZ"),
            ("delicious", "JJ"),
        ]);
        assert_eq!(
            TransformPipeline::default().run(&chunk),
            tagged(&[("delicious", "JJ"), ("recipe", "NN"), ("book", "NN")])
        );
    }

    #[test]
    fn test_run_traced_matches_run() {
        let chunk = tagged(&[("the", "DT"), ("book", "NN"), ("was", "VBD"), ("great", "JJ")]);
        let pipeline = TransformPipeline::default();
        let (tx, rx) = mpsc::channel();

        let traced = pipeline.run_traced(&chunk, &tx);
        drop(tx);
        assert_eq!(traced, pipeline.run(&chunk));

        let events: Vec<TransformEvent> = rx.iter().collect();
        assert_eq!(events.len(), pipeline.stages.len());
        let TransformEvent::StageApplied { stage, chunk } = &events[0];
        assert_eq!(stage, "filter_insignificant");
        assert_eq!(chunk, &tagged(&[("book", "NN"), ("was", "VBD"), ("great", "JJ")]));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let chunk = tagged(&[("Dec.", "NNP"), ("10", "CD")]);
        let before = chunk.clone();
        let _ = swap_noun_cardinal(&chunk);
        let _ = TransformPipeline::default().run(&chunk);
        assert_eq!(chunk, before);
    }

    #[test]
    fn test_from_names() {
        let pipeline = TransformPipeline::from_names(&["correct_verbs", "swap_noun_cardinal"]).unwrap();
        assert_eq!(pipeline.names(), vec!["correct_verbs", "swap_noun_cardinal"]);
        assert!(matches!(
            TransformPipeline::from_names(&["reverse"]),
            Err(ChunkError::Config(_))
        ));
    }

    #[test]
    fn test_chunk_tree_to_sent() {
        let tree: ChunkTree = "(S (NP Pierre/NNP Vinken/NNP) ,/, (NP 61/CD years/NNS) old/JJ ,/, will/MD join/VB \
            (NP the/DT board/NN) as/IN (NP a/DT nonexecutive/JJ director/NN Nov./NNP 29/CD) ./.)"
            .parse()
            .unwrap();
        assert_eq!(
            chunk_tree_to_sent(&tree, " "),
            "Pierre Vinken, 61 years old, will join the board as a nonexecutive director Nov. 29."
        );
    }
}
