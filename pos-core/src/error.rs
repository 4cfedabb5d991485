//! # Erros do Etiquetador
//!
//! Taxonomia de falhas do treinamento e da decodificação.
//!
//! - Problemas **por par** do corpus (ex: comprimentos diferentes) são
//!   registrados e descartados durante o treino; uma linha ruim não aborta o treinamento.
//! - Problemas **por sentença** na decodificação são devolvidos ao chamador, pois
//!   uma sequência de tags errada ou vazia corromperia a medição de acurácia.
//!
//! Palavras fora do vocabulário **não** são erro: recebem a penalidade fixa de emissão.

use thiserror::Error;

pub type Result<T, E = PosError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PosError {
    /// Nenhum par (palavras, tags) válido foi ingerido no treinamento.
    #[error("corpus de treinamento vazio: nenhum par alinhado válido")]
    EmptyCorpus,

    /// Um par de treinamento com quantidades diferentes de palavras e tags.
    #[error("linha {line}: {words} palavras e {tags} tags")]
    LengthMismatch { line: usize, words: usize, tags: usize },

    /// Decodificação chamada com zero palavras.
    #[error("sentença vazia")]
    EmptySentence,

    /// Todas as hipóteses morreram antes do último estágio.
    #[error("nenhum caminho de tags alcança a palavra {position}")]
    NoPathFound { position: usize },

    /// Penalidade de emissão não finita ou positiva (log10 precisa ser <= 0).
    #[error("penalidade de emissão inválida: {0}")]
    InvalidPenalty(f64),

    /// Linha de respostas com comprimento diferente da predição.
    #[error("linha {line}: {predicted} tags preditas e {expected} tags de referência")]
    AnswerMismatch {
        line: usize,
        predicted: usize,
        expected: usize,
    },

    /// Arquivo de respostas com quantidade de linhas diferente das sentenças.
    #[error("{sentences} sentenças mas {answers} linhas de referência")]
    MissingAnswers { sentences: usize, answers: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
