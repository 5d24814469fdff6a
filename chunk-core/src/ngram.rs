//! # Taggers de Referência
//!
//! Implementações concretas do trait [`Tagger`] usadas pelas cadeias de backoff:
//!
//! | Tagger            | Contexto observado                          |
//! |-------------------|---------------------------------------------|
//! | [`DefaultTagger`] | nenhum: sempre responde a mesma tag         |
//! | Unigram           | o token atual                               |
//! | Bigram / Trigram  | as `n-1` tags anteriores + o token atual    |
//! | Affix             | prefixo ou sufixo do token                  |
//! | [`RegexpTagger`]  | o primeiro padrão regex que casa            |
//! | [`NamesTagger`]   | pertença a uma lista de nomes próprios      |
//!
//! Os taggers de contexto ([`ContextTagger`]) aprendem por contagem simples:
//! para cada contexto guardam a tag mais frequente no treino.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::backoff::{BackoffChain, Tagger};
use crate::error::{ChunkError, Result};
use crate::tagger::TaggedToken;

/// Chave de contexto: histórico de tags (com lacunas `None`) seguido do token.
type Context = Vec<Option<String>>;

/// Construtores de taggers de contexto, na forma em que aparecem na
/// configuração (`"unigram"`, `{"ngram": 4}`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaggerClass {
    Unigram,
    Bigram,
    Trigram,
    Quadgram,
    /// N-grama de ordem arbitrária (n >= 1).
    Ngram(usize),
    /// Prefixo (`affix_length > 0`) ou sufixo (`affix_length < 0`) do token.
    Affix {
        affix_length: isize,
        min_stem_length: usize,
    },
}

impl TaggerClass {
    /// Sufixo de 3 caracteres com radical mínimo de 2, como no AffixTagger clássico.
    pub const DEFAULT_AFFIX: TaggerClass = TaggerClass::Affix {
        affix_length: -3,
        min_stem_length: 2,
    };

    fn kind(&self) -> ContextKind {
        match *self {
            TaggerClass::Unigram => ContextKind::Ngram(1),
            TaggerClass::Bigram => ContextKind::Ngram(2),
            TaggerClass::Trigram => ContextKind::Ngram(3),
            TaggerClass::Quadgram => ContextKind::Ngram(4),
            TaggerClass::Ngram(n) => ContextKind::Ngram(n.max(1)),
            TaggerClass::Affix {
                affix_length,
                min_stem_length,
            } => ContextKind::Affix {
                affix_length,
                min_stem_length,
            },
        }
    }

    /// Treina um tagger desta classe, usando `backoff` para podar contextos.
    pub fn train(&self, train_sents: &[Vec<TaggedToken>], backoff: Option<&BackoffChain>, cutoff: usize) -> ContextTagger {
        ContextTagger::train(self.kind(), train_sents, backoff, cutoff)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextKind {
    Ngram(usize),
    Affix {
        affix_length: isize,
        min_stem_length: usize,
    },
}

impl ContextKind {
    fn context(&self, tokens: &[String], index: usize, history: &[Option<String>]) -> Option<Context> {
        match *self {
            ContextKind::Ngram(n) => {
                let from = (index + 1).saturating_sub(n);
                let mut context: Context = history[from.min(history.len())..index.min(history.len())].to_vec();
                context.push(Some(tokens[index].clone()));
                Some(context)
            }
            ContextKind::Affix {
                affix_length,
                min_stem_length,
            } => {
                let chars: Vec<char> = tokens[index].chars().collect();
                let affix_len = affix_length.unsigned_abs();
                if chars.len() < min_stem_length + affix_len {
                    return None;
                }
                let affix: String = if affix_length > 0 {
                    chars[..affix_len].iter().collect()
                } else {
                    chars[chars.len() - affix_len..].iter().collect()
                };
                Some(vec![Some(affix)])
            }
        }
    }

    fn name(&self) -> String {
        match *self {
            ContextKind::Ngram(1) => "UnigramTagger".to_string(),
            ContextKind::Ngram(2) => "BigramTagger".to_string(),
            ContextKind::Ngram(3) => "TrigramTagger".to_string(),
            ContextKind::Ngram(4) => "QuadgramTagger".to_string(),
            ContextKind::Ngram(n) => format!("NgramTagger({n})"),
            ContextKind::Affix { affix_length, .. } => format!("AffixTagger({affix_length})"),
        }
    }
}

/// Tagger baseado em tabela `contexto → tag mais frequente`.
#[derive(Debug, Clone)]
pub struct ContextTagger {
    kind: ContextKind,
    model: HashMap<Context, String>,
}

impl ContextTagger {
    /// Treino por contagem.
    ///
    /// Um contexto só entra no modelo se:
    /// 1. a tag vencedora foi vista mais de `cutoff` vezes; e
    /// 2. ele é **útil**: em pelo menos uma ocorrência o `backoff` teria
    ///    errado (ou não há backoff). Contextos que o backoff já resolve
    ///    ficam de fora, o que mantém cada nível da cadeia pequeno.
    ///
    /// O histórico usado no treino é o ouro (as tags anotadas).
    fn train(kind: ContextKind, train_sents: &[Vec<TaggedToken>], backoff: Option<&BackoffChain>, cutoff: usize) -> Self {
        let mut counts: HashMap<Context, HashMap<String, usize>> = HashMap::new();
        let mut useful: HashSet<Context> = HashSet::new();

        for sentence in train_sents {
            let tokens: Vec<String> = sentence.iter().map(|t| t.word.clone()).collect();
            let gold: Vec<Option<String>> = sentence.iter().map(|t| Some(t.tag.clone())).collect();

            for (index, token) in sentence.iter().enumerate() {
                let history = &gold[..index];
                let Some(context) = kind.context(&tokens, index, history) else {
                    continue;
                };
                *counts
                    .entry(context.clone())
                    .or_default()
                    .entry(token.tag.clone())
                    .or_insert(0) += 1;

                let backoff_tag = backoff.and_then(|b| b.choose_tag(&tokens, index, history));
                if backoff_tag.as_deref() != Some(token.tag.as_str()) {
                    useful.insert(context);
                }
            }
        }

        let mut model = HashMap::new();
        for context in useful {
            let Some(dist) = counts.get(&context) else {
                continue;
            };
            // maior contagem; empate resolvido pela menor tag (determinístico)
            let best = dist
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)));
            if let Some((tag, &hits)) = best {
                if hits > cutoff {
                    model.insert(context, tag.clone());
                }
            }
        }

        Self { kind, model }
    }

    /// Unigram a partir de um modelo pronto `palavra → tag`.
    pub fn from_model(model: HashMap<String, String>) -> Self {
        Self {
            kind: ContextKind::Ngram(1),
            model: model
                .into_iter()
                .map(|(word, tag)| (vec![Some(word)], tag))
                .collect(),
        }
    }

    /// Número de contextos retidos.
    pub fn len(&self) -> usize {
        self.model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }
}

impl Tagger for ContextTagger {
    fn choose_tag(&self, tokens: &[String], index: usize, history: &[Option<String>]) -> Option<String> {
        let context = self.kind.context(tokens, index, history)?;
        self.model.get(&context).cloned()
    }

    fn describe(&self) -> String {
        self.kind.name()
    }
}

/// Modelo das tags mais prováveis para as `limit` palavras mais frequentes.
pub fn word_tag_model(words: &[String], tagged_words: &[TaggedToken], limit: usize) -> HashMap<String, String> {
    let mut word_freq: HashMap<&str, usize> = HashMap::new();
    for word in words {
        *word_freq.entry(word.as_str()).or_insert(0) += 1;
    }
    let mut tag_freq: HashMap<&str, HashMap<&str, usize>> = HashMap::new();
    for t in tagged_words {
        *tag_freq
            .entry(t.word.as_str())
            .or_default()
            .entry(t.tag.as_str())
            .or_insert(0) += 1;
    }

    let mut most_common: Vec<(&str, usize)> = word_freq.into_iter().collect();
    most_common.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    most_common
        .into_iter()
        .take(limit)
        .filter_map(|(word, _)| {
            let dist = tag_freq.get(word)?;
            let (tag, _) = dist
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))?;
            Some((word.to_string(), tag.to_string()))
        })
        .collect()
}

/// Sempre retorna a mesma tag. Último elo típico de uma cadeia.
#[derive(Debug, Clone)]
pub struct DefaultTagger {
    tag: String,
}

impl DefaultTagger {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl Tagger for DefaultTagger {
    fn choose_tag(&self, _tokens: &[String], _index: usize, _history: &[Option<String>]) -> Option<String> {
        Some(self.tag.clone())
    }

    fn describe(&self) -> String {
        format!("DefaultTagger({})", self.tag)
    }
}

/// Padrões morfológicos clássicos: números, gerúndios, "-ment", "-ful".
pub fn default_patterns() -> Vec<(&'static str, &'static str)> {
    vec![
        (r"^\d+$", "CD"),
        (r".*ing$", "VBG"),
        (r".*ment$", "NN"),
        (r".*ful$", "JJ"),
    ]
}

/// Tagger por expressões regulares: o primeiro padrão que casa vence.
///
/// Os padrões são ancorados no início do token.
#[derive(Debug, Clone)]
pub struct RegexpTagger {
    patterns: Vec<(Regex, String)>,
}

impl RegexpTagger {
    pub fn new(patterns: &[(&str, &str)]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|(pattern, tag)| {
                Regex::new(&format!("^(?:{pattern})"))
                    .map(|re| (re, tag.to_string()))
                    .map_err(|e| ChunkError::Config(format!("bad pattern {pattern:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }
}

impl Tagger for RegexpTagger {
    fn choose_tag(&self, tokens: &[String], index: usize, _history: &[Option<String>]) -> Option<String> {
        let token = &tokens[index];
        self.patterns
            .iter()
            .find(|(re, _)| re.is_match(token))
            .map(|(_, tag)| tag.clone())
    }

    fn describe(&self) -> String {
        format!("RegexpTagger({} patterns)", self.patterns.len())
    }
}

/// Marca como `NNP` qualquer token presente na lista de nomes (sem distinção
/// de caixa). A lista vem de fora: nenhum corpus de nomes é embutido.
#[derive(Debug, Clone)]
pub struct NamesTagger {
    names: HashSet<String>,
}

impl NamesTagger {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names.into_iter().map(|n| n.as_ref().to_lowercase()).collect(),
        }
    }
}

impl Tagger for NamesTagger {
    fn choose_tag(&self, tokens: &[String], index: usize, _history: &[Option<String>]) -> Option<String> {
        self.names
            .contains(&tokens[index].to_lowercase())
            .then(|| "NNP".to_string())
    }

    fn describe(&self) -> String {
        "NamesTagger".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::tagged;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    fn train() -> Vec<Vec<TaggedToken>> {
        vec![
            tagged(&[("the", "DT"), ("book", "NN"), ("is", "VBZ"), ("great", "JJ")]),
            tagged(&[("I", "PRP"), ("book", "VBP"), ("the", "DT"), ("flight", "NN")]),
            tagged(&[("the", "DT"), ("book", "NN"), ("was", "VBD"), ("long", "JJ")]),
        ]
    }

    #[test]
    fn test_unigram_picks_most_frequent_tag() {
        let tagger = TaggerClass::Unigram.train(&train(), None, 0);
        let tags = tagger.tag(&words("book the"));
        assert_eq!(tags, vec![Some("NN".to_string()), Some("DT".to_string())]);
        assert_eq!(tagger.describe(), "UnigramTagger");
    }

    #[test]
    fn test_bigram_uses_previous_tag() {
        let tagger = TaggerClass::Bigram.train(&train(), None, 0);
        // depois de PRP, "book" é verbo
        let tags = tagger.choose_tag(&words("I book"), 1, &[Some("PRP".to_string())]);
        assert_eq!(tags.as_deref(), Some("VBP"));
        // contexto nunca visto
        let unseen = tagger.choose_tag(&words("I book"), 1, &[Some("JJ".to_string())]);
        assert_eq!(unseen, None);
    }

    #[test]
    fn test_backoff_prunes_contexts_it_already_resolves() {
        let fallback = BackoffChain::from_tagger(DefaultTagger::new("DT"));
        let pruned = TaggerClass::Unigram.train(&train(), Some(&fallback), 0);
        let full = TaggerClass::Unigram.train(&train(), None, 0);
        // "the" sempre é DT: o backoff já acerta, o contexto é descartado
        assert!(pruned.len() < full.len());
        assert_eq!(pruned.choose_tag(&words("the"), 0, &[]), None);
    }

    #[test]
    fn test_cutoff_drops_rare_contexts() {
        let tagger = TaggerClass::Unigram.train(&train(), None, 1);
        assert_eq!(tagger.choose_tag(&words("the"), 0, &[]).as_deref(), Some("DT"));
        assert_eq!(tagger.choose_tag(&words("flight"), 0, &[]), None);
    }

    #[test]
    fn test_affix_tagger() {
        let sents = vec![tagged(&[("running", "VBG"), ("jumping", "VBG"), ("go", "VB")])];
        let tagger = TaggerClass::DEFAULT_AFFIX.train(&sents, None, 0);
        assert_eq!(tagger.choose_tag(&words("walking"), 0, &[]).as_deref(), Some("VBG"));
        // curto demais para ter radical + sufixo
        assert_eq!(tagger.choose_tag(&words("go"), 0, &[]), None);
        assert_eq!(tagger.describe(), "AffixTagger(-3)");
    }

    #[test]
    fn test_from_model_lookup() {
        let model = HashMap::from([("Pierre".to_string(), "NN".to_string())]);
        let tagger = ContextTagger::from_model(model);
        let tags = tagger.tag(&words("Pierre Vinken"));
        assert_eq!(tags, vec![Some("NN".to_string()), None]);
    }

    #[test]
    fn test_word_tag_model_limit() {
        let sents = train();
        let tagged_words: Vec<TaggedToken> = sents.iter().flatten().cloned().collect();
        let all_words: Vec<String> = tagged_words.iter().map(|t| t.word.clone()).collect();
        let model = word_tag_model(&all_words, &tagged_words, 2);
        assert_eq!(model.len(), 2);
        assert_eq!(model.get("the").map(String::as_str), Some("DT"));
        assert_eq!(model.get("book").map(String::as_str), Some("NN"));
    }

    #[test]
    fn test_regexp_tagger() {
        let tagger = RegexpTagger::new(&default_patterns()).unwrap();
        let tags = tagger.tag(&words("61 wondering wonderment wonderful x"));
        assert_eq!(
            tags,
            vec![
                Some("CD".to_string()),
                Some("VBG".to_string()),
                Some("NN".to_string()),
                Some("JJ".to_string()),
                None,
            ]
        );
        assert!(RegexpTagger::new(&[("(", "X")]).is_err());
    }

    #[test]
    fn test_names_tagger() {
        let tagger = NamesTagger::new(["Jacob", "Ana"]);
        assert_eq!(tagger.tag(&words("jacob runs")), vec![Some("NNP".to_string()), None]);
    }
}
