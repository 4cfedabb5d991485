//! # Tags Morfossintáticas e Guia do Conjunto de Tags
//!
//! Define o tipo [`Tag`] usado como estado oculto do HMM e a tabela de referência
//! do conjunto de tags simplificado do corpus Brown.
//!
//! ## Normalização
//!
//! Toda comparação é **insensível a maiúsculas**:
//! - Tags são normalizadas para MAIÚSCULAS (`"det"` → `"DET"`).
//! - Palavras são normalizadas para minúsculas (`"The"` → `"the"`).
//!
//! O restante do sistema consulta as tabelas exclusivamente pela forma normalizada.
//!
//! ## Conjunto de Tags (Brown simplificado)
//!
//! | Tag | Significado          | Exemplos                        |
//! |-----|----------------------|---------------------------------|
//! | N   | Substantivo          | year, home, costs               |
//! | V   | Verbo                | is, has, get                    |
//! | DET | Determinante         | the, a, some                    |
//! | P   | Preposição           | on, of, at                      |
//! | ... | (ver [`TAG_GUIDE`])  |                                 |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Estado oculto do HMM.
///
/// `Start` é a sentinela de "início de sentença": possui linha própria na tabela de
/// transições, mas nunca é emitida como resposta. Modelá-la como variante (e não como
/// uma string mágica tipo `"#"`) impede que ela vaze para a saída.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tag {
    Start,
    Label(String),
}

impl Tag {
    /// Constrói uma tag comum a partir de texto cru, já normalizada.
    pub fn label(raw: &str) -> Self {
        Tag::Label(normalize_tag(raw))
    }

    /// Retorna o rótulo da tag, ou `None` para a sentinela `Start`.
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Tag::Start => None,
            Tag::Label(label) => Some(label),
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, Tag::Start)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Start => write!(f, "<START>"),
            Tag::Label(label) => write!(f, "{label}"),
        }
    }
}

/// Normaliza um rótulo de tag (maiúsculas, sem espaços nas bordas).
pub fn normalize_tag(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Normaliza uma palavra (minúsculas, sem espaços nas bordas).
pub fn normalize_word(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Uma palavra da sentença com a tag atribuída pelo decodificador.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedWord {
    /// Palavra como apareceu na entrada (sem normalização).
    pub word: String,
    /// Tag predita (normalizada).
    pub tag: String,
    /// Posição da palavra na sentença.
    pub index: usize,
}

impl fmt::Display for TaggedWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.word, self.tag)
    }
}

/// Junta palavras etiquetadas no formato `palavra/TAG palavra/TAG`.
pub fn render(tagged: &[TaggedWord]) -> String {
    tagged
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Entrada do guia de referência de tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagInfo {
    /// Rótulo como aparece no corpus (ex: "VD").
    pub label: &'static str,
    /// Nome da classe gramatical.
    pub name: &'static str,
    /// Palavras típicas da classe.
    pub examples: &'static str,
}

/// Guia do conjunto de tags simplificado do corpus Brown.
pub const TAG_GUIDE: &[TagInfo] = &[
    TagInfo { label: "ADJ", name: "adjective", examples: "new, good, high, special, big, local" },
    TagInfo { label: "ADV", name: "adverb", examples: "really, already, still, early, now" },
    TagInfo { label: "CNJ", name: "conjunction", examples: "and, or, but, if, while, although" },
    TagInfo { label: "DET", name: "determiner", examples: "the, a, some, most, every, no" },
    TagInfo { label: "EX", name: "existential", examples: "there, there's" },
    TagInfo { label: "FW", name: "foreign word", examples: "dolce, ersatz, esprit, quo, maitre" },
    TagInfo { label: "MOD", name: "modal verb", examples: "will, can, would, may, must, should" },
    TagInfo { label: "N", name: "noun", examples: "year, home, costs, time, education" },
    TagInfo { label: "NP", name: "proper noun", examples: "Alison, Africa, April, Washington" },
    TagInfo { label: "NUM", name: "number", examples: "twenty-four, fourth, 1991, 14:24" },
    TagInfo { label: "PRO", name: "pronoun", examples: "he, their, her, its, my, I, us" },
    TagInfo { label: "P", name: "preposition", examples: "on, of, at, with, by, into, under" },
    TagInfo { label: "TO", name: "the word to", examples: "to" },
    TagInfo { label: "UH", name: "interjection", examples: "ah, bang, ha, whee, hmpf, oops" },
    TagInfo { label: "V", name: "verb", examples: "is, has, get, do, make, see, run" },
    TagInfo { label: "VD", name: "past tense", examples: "said, took, told, made, asked" },
    TagInfo { label: "VG", name: "present participle", examples: "making, going, playing, working" },
    TagInfo { label: "VN", name: "past participle", examples: "given, taken, begun, sung" },
    TagInfo { label: "WH", name: "wh determiner", examples: "who, which, when, what, where, how" },
];

/// Busca uma tag no guia (insensível a maiúsculas).
pub fn describe(label: &str) -> Option<&'static TagInfo> {
    let label = normalize_tag(label);
    TAG_GUIDE.iter().find(|info| info.label == label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_normalized() {
        assert_eq!(Tag::label(" det "), Tag::Label("DET".to_string()));
        assert_eq!(Tag::label("Np").as_label(), Some("NP"));
    }

    #[test]
    fn test_start_has_no_label() {
        assert!(Tag::Start.is_start());
        assert_eq!(Tag::Start.as_label(), None);
        assert_eq!(Tag::Start.to_string(), "<START>");
    }

    #[test]
    fn test_start_orders_before_labels() {
        // Linhas de transição são iteradas em ordem: START vem primeiro
        assert!(Tag::Start < Tag::label("ADJ"));
        assert!(Tag::label("ADJ") < Tag::label("N"));
    }

    #[test]
    fn test_render_word_tag_pairs() {
        let tagged = vec![
            TaggedWord { word: "The".into(), tag: "DET".into(), index: 0 },
            TaggedWord { word: "dog".into(), tag: "N".into(), index: 1 },
        ];
        assert_eq!(render(&tagged), "The/DET dog/N");
    }

    #[test]
    fn test_describe_is_case_insensitive() {
        let info = describe("vd").expect("VD está no guia");
        assert_eq!(info.name, "past tense");
        assert!(describe("XYZ").is_none());
    }
}
