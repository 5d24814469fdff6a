//! # Cadeia de Backoff de Taggers
//!
//! Um *backoff tagger* consulta o próximo tagger da cadeia quando não consegue
//! prever uma tag. A cadeia é construída dobrando (fold) uma lista de classes
//! de tagger da esquerda para a direita: cada tagger novo recebe a cadeia
//! construída até então como backoff.
//!
//! ## Ordem de Resolução
//!
//! A ordem de consulta é o **inverso** da ordem de construção:
//!
//! ```text
//! construção: [Unigram, Bigram, Trigram] + backoff Default
//! resolução:   Trigram → Bigram → Unigram → Default → None
//! ```
//!
//! O último tagger construído tem a primeira chance de responder. Se nenhum
//! tagger da cadeia responde, a predição é `None` para aquele token.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::ngram::TaggerClass;
use crate::tagger::TaggedToken;

/// Capacidade de etiquetar: prediz a tag do token `index` dado o histórico
/// de tags já atribuídas às posições anteriores.
///
/// Qualquer tagger estatístico, baseado em regras ou em classificador que
/// implemente este trait pode ser plugado em uma [`BackoffChain`].
pub trait Tagger: Send + Sync {
    /// Retorna `None` quando o tagger não sabe responder.
    fn choose_tag(&self, tokens: &[String], index: usize, history: &[Option<String>]) -> Option<String>;

    /// Nome legível (ex: "BigramTagger"), usado em logs e inspeção da cadeia.
    fn describe(&self) -> String;

    /// Etiqueta a sequência inteira da esquerda para a direita, alimentando
    /// o histórico com as próprias predições.
    fn tag(&self, tokens: &[String]) -> Vec<Option<String>> {
        let mut history: Vec<Option<String>> = Vec::with_capacity(tokens.len());
        for index in 0..tokens.len() {
            let tag = self.choose_tag(tokens, index, &history);
            history.push(tag);
        }
        history
    }
}

/// Cadeia ordenada de taggers que se comporta como um único [`Tagger`].
///
/// Os taggers ficam atrás de `Arc`, então clonar a cadeia é barato e ela pode
/// ser compartilhada (somente leitura) entre threads depois do treino.
#[derive(Clone, Default)]
pub struct BackoffChain {
    taggers: Vec<Arc<dyn Tagger>>,
}

impl BackoffChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cadeia com um único tagger.
    pub fn from_tagger(tagger: impl Tagger + 'static) -> Self {
        Self {
            taggers: vec![Arc::new(tagger)],
        }
    }

    /// Coloca `tagger` na frente da cadeia: ele passa a ter a primeira chance.
    pub fn with_front(mut self, tagger: Arc<dyn Tagger>) -> Self {
        self.taggers.insert(0, tagger);
        self
    }

    /// Taggers na ordem de resolução.
    pub fn taggers(&self) -> &[Arc<dyn Tagger>] {
        &self.taggers
    }

    /// Nomes dos taggers na ordem em que serão consultados.
    pub fn resolution_order(&self) -> Vec<String> {
        self.taggers.iter().map(|t| t.describe()).collect()
    }

    pub fn len(&self) -> usize {
        self.taggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taggers.is_empty()
    }
}

impl Tagger for BackoffChain {
    fn choose_tag(&self, tokens: &[String], index: usize, history: &[Option<String>]) -> Option<String> {
        self.taggers
            .iter()
            .find_map(|tagger| tagger.choose_tag(tokens, index, history))
    }

    fn describe(&self) -> String {
        format!("BackoffChain[{}]", self.resolution_order().join(" -> "))
    }
}

impl fmt::Debug for BackoffChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.resolution_order()).finish()
    }
}

/// Constrói uma cadeia de backoff treinando cada classe sobre `train_sents`.
///
/// `T1 = C1(train, backoff)`, `T2 = C2(train, T1)`, ..., resultado = `Tn`.
///
/// Nas sentenças de treino, `word` é o que o tagger observa e `tag` é o que
/// ele aprende a prever. Para o [`crate::chunkers::TagChunker`] isso significa
/// `(tag POS, rótulo IOB)`.
pub fn backoff_tagger(
    train_sents: &[Vec<TaggedToken>],
    classes: &[TaggerClass],
    backoff: Option<BackoffChain>,
) -> BackoffChain {
    backoff_tagger_with_cutoff(train_sents, classes, backoff, 0)
}

/// Como [`backoff_tagger`], descartando contextos vistos `cutoff` vezes ou menos.
pub fn backoff_tagger_with_cutoff(
    train_sents: &[Vec<TaggedToken>],
    classes: &[TaggerClass],
    backoff: Option<BackoffChain>,
    cutoff: usize,
) -> BackoffChain {
    let mut chain = backoff.unwrap_or_default();

    for class in classes {
        let previous = (!chain.is_empty()).then_some(&chain);
        let tagger = class.train(train_sents, previous, cutoff);
        debug!(
            tagger = %tagger.describe(),
            contexts = tagger.len(),
            "trained tagger for backoff chain"
        );
        chain = chain.with_front(Arc::new(tagger));
    }

    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus;
    use crate::ngram::DefaultTagger;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_resolution_order_is_reverse_of_construction() {
        let train = corpus::tagged_sents();
        let chain = backoff_tagger(
            &train,
            &[TaggerClass::Unigram, TaggerClass::Bigram, TaggerClass::Trigram],
            Some(BackoffChain::from_tagger(DefaultTagger::new("NN"))),
        );

        assert_eq!(
            chain.resolution_order(),
            vec!["TrigramTagger", "BigramTagger", "UnigramTagger", "DefaultTagger(NN)"]
        );
    }

    #[test]
    fn test_default_backoff_catches_unknown_words() {
        let train = corpus::tagged_sents();
        let chain = backoff_tagger(
            &train,
            &[TaggerClass::Unigram],
            Some(BackoffChain::from_tagger(DefaultTagger::new("NN"))),
        );

        let tags = chain.tag(&words("the zyzzyva"));
        assert_eq!(tags[0].as_deref(), Some("DT"));
        assert_eq!(tags[1].as_deref(), Some("NN"));
    }

    #[test]
    fn test_chain_without_fallback_yields_none() {
        let train = corpus::tagged_sents();
        let chain = backoff_tagger(&train, &[TaggerClass::Unigram], None);

        let tags = chain.tag(&words("the zyzzyva"));
        assert_eq!(tags[0].as_deref(), Some("DT"));
        assert_eq!(tags[1], None);
    }

    #[test]
    fn test_empty_chain() {
        let chain = backoff_tagger(&[], &[], None);
        assert!(chain.is_empty());
        assert_eq!(chain.tag(&words("a b")), vec![None, None]);

        let fallback = BackoffChain::from_tagger(DefaultTagger::new("NN"));
        let same = backoff_tagger(&[], &[], Some(fallback));
        assert_eq!(same.resolution_order(), vec!["DefaultTagger(NN)"]);
    }

    #[test]
    fn test_first_refusal_goes_to_front_tagger() {
        struct Fixed(&'static str);
        impl Tagger for Fixed {
            fn choose_tag(&self, _: &[String], _: usize, _: &[Option<String>]) -> Option<String> {
                Some(self.0.to_string())
            }
            fn describe(&self) -> String {
                format!("Fixed({})", self.0)
            }
        }

        let chain = BackoffChain::from_tagger(Fixed("B"))
            .with_front(Arc::new(Fixed("A")));
        assert_eq!(chain.tag(&words("x")), vec![Some("A".to_string())]);
    }
}
