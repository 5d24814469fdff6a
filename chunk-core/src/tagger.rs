//! # Tokens Etiquetados e Esquema IOB
//!
//! Define os tipos básicos que circulam por todo o crate:
//!
//! - [`TaggedToken`]: par `(palavra, tag)`, onde a tag é uma etiqueta POS
//!   (Penn Treebank: `NN`, `VBZ`, `DT`, ...). Tags são strings opacas: o
//!   conjunto de tags é externo e extensível, então não vira um `enum`.
//! - [`IobLabel`]: rótulo de chunk no esquema **IOB** usado pelo bridge.
//! - [`IobTriple`]: a tripla `(palavra, tag, rótulo)` do formato CoNLL.
//!
//! ## Esquema IOB
//!
//! - `B-TIPO`: Begin, primeiro token de um chunk do tipo TIPO
//! - `I-TIPO`: Inside, tokens seguintes do mesmo chunk
//! - `O`: Outside, fora de qualquer chunk
//!
//! Uma sequência maximal `B-X I-X*` forma exatamente um chunk.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChunkError;

/// Um token com sua etiqueta morfossintática.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedToken {
    pub word: String,
    pub tag: String,
}

impl TaggedToken {
    pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }
}

impl From<(&str, &str)> for TaggedToken {
    fn from((word, tag): (&str, &str)) -> Self {
        Self::new(word, tag)
    }
}

impl From<(String, String)> for TaggedToken {
    fn from((word, tag): (String, String)) -> Self {
        Self { word, tag }
    }
}

impl fmt::Display for TaggedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.word, self.tag)
    }
}

/// Uma sentença etiquetada: a ordem dos tokens é significativa.
pub type TaggedSequence = Vec<TaggedToken>;

/// Constrói uma sequência a partir de pares literais, útil em testes e demos.
pub fn tagged(pairs: &[(&str, &str)]) -> TaggedSequence {
    pairs.iter().map(|&p| TaggedToken::from(p)).collect()
}

/// Descarta as tags e retorna apenas as palavras.
pub fn untag(tokens: &[TaggedToken]) -> Vec<String> {
    tokens.iter().map(|t| t.word.clone()).collect()
}

/// Rótulo de chunk no esquema IOB.
///
/// O tipo do chunk (`NP`, `VP`, `PERSON`, ...) também é uma string opaca.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IobLabel {
    /// **Begin**: abre um chunk. Ex: **the** (B-NP) book.
    Begin(String),
    /// **Inside**: continua o chunk aberto. Ex: the **book** (I-NP).
    Inside(String),
    /// **Outside**: o token não pertence a nenhum chunk.
    Outside,
}

impl IobLabel {
    /// Representação textual (ex: "B-NP", "I-NP", "O")
    pub fn label(&self) -> String {
        match self {
            IobLabel::Begin(kind) => format!("B-{kind}"),
            IobLabel::Inside(kind) => format!("I-{kind}"),
            IobLabel::Outside => "O".to_string(),
        }
    }

    /// Tipo do chunk, se for B- ou I-
    pub fn chunk_type(&self) -> Option<&str> {
        match self {
            IobLabel::Begin(kind) | IobLabel::Inside(kind) => Some(kind),
            IobLabel::Outside => None,
        }
    }

    /// Verifica se a transição `prev → next` é válida no esquema IOB.
    ///
    /// - `I-X` só pode seguir `B-X` ou `I-X` (mesmo tipo)
    /// - `B-X` e `O` podem seguir qualquer rótulo
    pub fn is_valid_transition(prev: &IobLabel, next: &IobLabel) -> bool {
        match next {
            IobLabel::Inside(kind) => match prev {
                IobLabel::Begin(prev_kind) | IobLabel::Inside(prev_kind) => prev_kind == kind,
                IobLabel::Outside => false,
            },
            _ => true,
        }
    }
}

impl FromStr for IobLabel {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "O" {
            return Ok(IobLabel::Outside);
        }
        match s.split_once('-') {
            Some(("B", kind)) if !kind.is_empty() => Ok(IobLabel::Begin(kind.to_string())),
            Some(("I", kind)) if !kind.is_empty() => Ok(IobLabel::Inside(kind.to_string())),
            _ => Err(ChunkError::BadIobLabel(s.to_string())),
        }
    }
}

impl fmt::Display for IobLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Tripla CoNLL: palavra, tag POS e rótulo de chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IobTriple {
    pub word: String,
    pub tag: String,
    pub label: IobLabel,
}

impl IobTriple {
    pub fn new(word: impl Into<String>, tag: impl Into<String>, label: IobLabel) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
            label,
        }
    }

    /// Parseia a partir de literais (ex: `("the", "DT", "B-NP")`).
    pub fn parse(word: &str, tag: &str, label: &str) -> Result<Self, ChunkError> {
        Ok(Self::new(word, tag, label.parse()?))
    }

    pub fn token(&self) -> TaggedToken {
        TaggedToken::new(self.word.clone(), self.tag.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iob_labels() {
        assert_eq!(IobLabel::Outside.label(), "O");
        assert_eq!(IobLabel::Begin("NP".into()).label(), "B-NP");
        assert_eq!(IobLabel::Inside("PERSON".into()).label(), "I-PERSON");
    }

    #[test]
    fn test_iob_from_str() {
        assert_eq!("O".parse::<IobLabel>(), Ok(IobLabel::Outside));
        assert_eq!("B-NP".parse::<IobLabel>(), Ok(IobLabel::Begin("NP".into())));
        // o tipo pode conter hífens
        assert_eq!(
            "I-NP-TMP".parse::<IobLabel>(),
            Ok(IobLabel::Inside("NP-TMP".into()))
        );
        assert!(matches!("X-NP".parse::<IobLabel>(), Err(ChunkError::BadIobLabel(_))));
        assert!("B-".parse::<IobLabel>().is_err());
        assert!("NP".parse::<IobLabel>().is_err());
    }

    #[test]
    fn test_valid_transitions() {
        let b_np = IobLabel::Begin("NP".into());
        let i_np = IobLabel::Inside("NP".into());
        let i_vp = IobLabel::Inside("VP".into());
        assert!(IobLabel::is_valid_transition(&b_np, &i_np));
        assert!(IobLabel::is_valid_transition(&i_np, &i_np));
        assert!(!IobLabel::is_valid_transition(&IobLabel::Outside, &i_np));
        assert!(!IobLabel::is_valid_transition(&b_np, &i_vp));
    }

    #[test]
    fn test_untag() {
        let sent = tagged(&[("Hello", "NN"), ("World", "NN")]);
        assert_eq!(untag(&sent), vec!["Hello", "World"]);
        assert_eq!(sent[0].to_string(), "Hello/NN");
    }
}
