//! # Corpus de Treinamento Alinhado (palavras / tags)
//!
//! O corpus chega em **duas fontes paralelas**, linha a linha:
//!
//! ```text
//! sentences.txt:  the dog saw a cat .
//! tags.txt:       DET N VD DET N .
//! ```
//!
//! Cada linha é dividida em espaços em branco. Linhas cujas quantidades de
//! palavras e tags diferem são descartadas (e registradas em log); a leitura
//! termina quando a fonte mais curta acaba.
//!
//! Também há um pequeno corpus embutido ([`demo_corpus`]) em inglês, anotado com o
//! conjunto de tags simplificado do Brown, usado quando nenhum arquivo é configurado.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PosError, Result};

/// Um par alinhado (sequência de palavras, sequência de tags).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPair {
    pub words: Vec<String>,
    pub tags: Vec<String>,
}

impl TrainingPair {
    pub fn new<W, T>(words: W, tags: T) -> Self
    where
        W: IntoIterator,
        W::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Constrói o par a partir de duas linhas separadas por espaços.
    pub fn from_lines(sentence: &str, tags: &str) -> Self {
        Self::new(sentence.split_whitespace(), tags.split_whitespace())
    }

    /// Palavras e tags têm o mesmo comprimento?
    pub fn is_aligned(&self) -> bool {
        self.words.len() == self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Falha com [`PosError::LengthMismatch`] se o par estiver desalinhado.
    pub fn validate(&self, line: usize) -> Result<()> {
        if self.is_aligned() {
            Ok(())
        } else {
            Err(PosError::LengthMismatch {
                line,
                words: self.words.len(),
                tags: self.tags.len(),
            })
        }
    }
}

/// Resultado da leitura de um corpus.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// Pares válidos, na ordem do arquivo.
    pub pairs: Vec<TrainingPair>,
    /// Linhas descartadas por desalinhamento.
    pub skipped: usize,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Lê duas fontes paralelas (sentenças e tags) e devolve os pares alinhados.
///
/// Linhas em branco nas duas fontes são ignoradas. Erros de I/O são propagados;
/// desalinhamentos não.
pub fn load_pairs<S, T>(sentences: S, tags: T) -> Result<Corpus>
where
    S: BufRead,
    T: BufRead,
{
    let mut corpus = Corpus::default();

    for (index, (sentence, tag_line)) in sentences.lines().zip(tags.lines()).enumerate() {
        let line = index + 1;
        let pair = TrainingPair::from_lines(&sentence?, &tag_line?);

        if pair.is_empty() {
            debug!(line, "linha em branco ignorada");
            continue;
        }
        match pair.validate(line) {
            Ok(()) => corpus.pairs.push(pair),
            Err(e) => {
                warn!("{e}; linha descartada");
                corpus.skipped += 1;
            }
        }
    }

    info!(pairs = corpus.len(), skipped = corpus.skipped, "corpus carregado");
    Ok(corpus)
}

/// Como [`load_pairs`], abrindo os dois arquivos.
pub fn load_pairs_from_files<P, Q>(sentences: P, tags: Q) -> Result<Corpus>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let sentences = BufReader::new(File::open(sentences)?);
    let tags = BufReader::new(File::open(tags)?);
    load_pairs(sentences, tags)
}

/// Lê um arquivo de sentenças (ou de respostas): uma sequência de tokens por linha.
///
/// Linhas em branco viram sequências vazias, preservando o alinhamento por linha.
pub fn read_lines<R: BufRead>(reader: R) -> Result<Vec<Vec<String>>> {
    reader
        .lines()
        .map(|line| Ok(line?.split_whitespace().map(str::to_string).collect()))
        .collect()
}

pub fn read_lines_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>> {
    read_lines(BufReader::new(File::open(path)?))
}

/// Corpus de demonstração: (sentença, tags), já tokenizado por espaços.
const DEMO_SENTENCES: &[(&str, &str)] = &[
    ("the dog saw a cat .", "DET N VD DET N ."),
    ("a cat runs in the park .", "DET N V P DET N ."),
    ("she will go to the store .", "PRO MOD V TO DET N ."),
    ("he is running home .", "PRO V VG N ."),
    ("the old man was given a new book .", "DET ADJ N VD VN DET ADJ N ."),
    ("we can see the big house .", "PRO MOD V DET ADJ N ."),
    ("they played in the garden and sang .", "PRO VD P DET N CNJ VD ."),
    ("there is a dog in the house .", "EX V DET N P DET N ."),
    ("who saw the cat ?", "WH VD DET N ."),
    ("alison went to africa in april .", "NP VD TO NP P NP ."),
    ("the children are playing with a ball .", "DET N V VG P DET N ."),
    ("oh , the dog ate my food !", "UH , DET N VD PRO N ."),
    ("i really like good food .", "PRO ADV V ADJ N ."),
    ("the man has taken two books .", "DET N V VN NUM N ."),
    ("a bird can fly .", "DET N MOD V ."),
    ("she quickly read the letter .", "PRO ADV VD DET N ."),
    ("the dog runs .", "DET N V ."),
    ("my friend will visit us in june .", "PRO N MOD V PRO P NP ."),
    ("he told her a story about washington .", "PRO VD PRO DET N P NP ."),
    ("the weather was good but cold .", "DET N VD ADJ CNJ ADJ ."),
];

/// Retorna o corpus de demonstração embutido.
pub fn demo_corpus() -> Vec<TrainingPair> {
    DEMO_SENTENCES
        .iter()
        .map(|(sentence, tags)| TrainingPair::from_lines(sentence, tags))
        .collect()
}

/// Sentenças de exemplo para a interface (não fazem parte do treino).
pub fn demo_texts() -> Vec<&'static str> {
    vec![
        "The cat saw a dog in the garden.",
        "She will read the new book.",
        "My friend played with the ball and sang.",
        "Who will visit Washington in June?",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_load_pairs_skips_mismatched_lines() {
        let sentences = Cursor::new("the dog runs\na cat\nbirds fly\n");
        let tags = Cursor::new("DET N V\nDET\nN V\n");

        let corpus = load_pairs(sentences, tags).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.skipped, 1);
        assert_eq!(corpus.pairs[0].words, vec!["the", "dog", "runs"]);
        assert_eq!(corpus.pairs[1].tags, vec!["N", "V"]);
    }

    #[test]
    fn test_load_pairs_stops_at_shorter_source() {
        let sentences = Cursor::new("the dog runs\nbirds fly\n");
        let tags = Cursor::new("DET N V\n");

        let corpus = load_pairs(sentences, tags).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.skipped, 0);
    }

    #[test]
    fn test_load_pairs_ignores_blank_lines() {
        let sentences = Cursor::new("\nthe  dog\t runs\n");
        let tags = Cursor::new("   \nDET N V\n");

        let corpus = load_pairs(sentences, tags).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.pairs[0].len(), 3);
    }

    #[test]
    fn test_validate_reports_line() {
        let pair = TrainingPair::from_lines("a b c", "X Y");
        match pair.validate(7) {
            Err(PosError::LengthMismatch { line, words, tags }) => {
                assert_eq!((line, words, tags), (7, 3, 2));
            }
            other => panic!("esperava LengthMismatch, veio {other:?}"),
        }
    }

    #[test]
    fn test_read_lines_keeps_blank_lines() {
        let lines = read_lines(Cursor::new("the dog\n\na cat runs\n")).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].is_empty());
        assert_eq!(lines[2], vec!["a", "cat", "runs"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_pairs_from_files("/nonexistent/sentences.txt", "/nonexistent/tags.txt");
        assert!(matches!(result, Err(PosError::Io(_))));
    }

    #[test]
    fn test_demo_corpus_is_aligned() {
        let corpus = demo_corpus();
        assert_eq!(corpus.len(), DEMO_SENTENCES.len());
        for pair in &corpus {
            assert!(pair.is_aligned(), "desalinhado: {:?}", pair.words);
            assert!(!pair.is_empty());
        }
    }
}
