//! # Avaliação de Acurácia
//!
//! Compara as tags preditas com um arquivo de respostas, linha a linha e palavra a palavra.
//! Além dos totais (corretas / erradas / porcentagem), mantém contagens por tag para
//! precisão e revocação.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::error::{PosError, Result};
use crate::tagset::normalize_tag;

/// Contagens de uma tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagMeasure {
    /// Predições corretas desta tag.
    pub correct: usize,
    /// Ocorrências na referência.
    pub observed: usize,
    /// Vezes em que o modelo predisse esta tag.
    pub predicted: usize,
}

impl TagMeasure {
    #[inline]
    pub fn precision(&self) -> f64 {
        ratio(self.correct, self.predicted)
    }

    #[inline]
    pub fn recall(&self) -> f64 {
        ratio(self.correct, self.observed)
    }
}

/// Acurácia acumulada sobre um conjunto de sentenças.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Accuracy {
    /// Tags corretas.
    pub correct: usize,
    /// Tags erradas (inclui as palavras de sentenças que falharam).
    pub wrong: usize,
    /// Sentenças avaliadas.
    pub sentences: usize,
    /// Sentenças cuja decodificação falhou.
    pub failed_sentences: usize,
    /// Contagens por tag da referência / predição.
    pub by_tag: BTreeMap<String, TagMeasure>,
}

impl Accuracy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.correct + self.wrong
    }

    /// Porcentagem de tags corretas (0 quando nada foi avaliado).
    pub fn percentage(&self) -> f64 {
        ratio(self.correct, self.total()) * 100.0
    }

    /// Acumula uma sentença decodificada contra sua linha de referência.
    ///
    /// A comparação ignora maiúsculas/minúsculas.
    pub fn accumulate<P, R>(&mut self, line: usize, predicted: &[P], reference: &[R]) -> Result<()>
    where
        P: AsRef<str>,
        R: AsRef<str>,
    {
        if predicted.len() != reference.len() {
            return Err(PosError::AnswerMismatch {
                line,
                predicted: predicted.len(),
                expected: reference.len(),
            });
        }

        for (p, r) in predicted.iter().zip(reference) {
            let p = normalize_tag(p.as_ref());
            let r = normalize_tag(r.as_ref());

            self.by_tag.entry(r.clone()).or_default().observed += 1;
            self.by_tag.entry(p.clone()).or_default().predicted += 1;
            if p == r {
                self.by_tag.entry(r).or_default().correct += 1;
                self.correct += 1;
            } else {
                self.wrong += 1;
            }
        }
        self.sentences += 1;
        Ok(())
    }

    /// Conta todas as palavras de uma sentença que falhou como erradas.
    pub fn accumulate_failure<R: AsRef<str>>(&mut self, reference: &[R]) {
        for r in reference {
            self.by_tag.entry(normalize_tag(r.as_ref())).or_default().observed += 1;
        }
        self.wrong += reference.len();
        self.sentences += 1;
        self.failed_sentences += 1;
    }
}

impl Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Out of {} tags, {} correct and {} wrong",
            self.total(),
            self.correct,
            self.wrong
        )?;
        writeln!(f, "Percentage accuracy: {:.2}%", self.percentage())?;
        if self.failed_sentences > 0 {
            writeln!(f, "Sentences without a path: {}/{}", self.failed_sentences, self.sentences)?;
        }
        writeln!(f, "Performance by tag (#match, #model, #ref) (precision, recall):")?;
        for (tag, m) in &self.by_tag {
            writeln!(
                f,
                "\t{}: ({}, {}, {}) ({:.4}, {:.4})",
                tag,
                m.correct,
                m.predicted,
                m.observed,
                m.precision(),
                m.recall()
            )?;
        }
        Ok(())
    }
}

/// Avalia predições (uma por sentença) contra as linhas de resposta.
///
/// Sentenças com erro de decodificação contam todas as suas palavras como erradas;
/// quantidades diferentes de sentenças e respostas são erro.
pub fn evaluate<R: AsRef<str>>(
    predictions: &[Result<Vec<String>>],
    answers: &[Vec<R>],
) -> Result<Accuracy> {
    if predictions.len() != answers.len() {
        return Err(PosError::MissingAnswers {
            sentences: predictions.len(),
            answers: answers.len(),
        });
    }

    let mut accuracy = Accuracy::new();
    for (index, (prediction, reference)) in predictions.iter().zip(answers).enumerate() {
        match prediction {
            Ok(tags) => accuracy.accumulate(index + 1, tags, reference)?,
            Err(_) => accuracy.accumulate_failure(reference),
        }
    }
    Ok(accuracy)
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
