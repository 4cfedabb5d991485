//! # Pipeline de Etiquetagem
//!
//! O pipeline é dono do [`HmmModel`] treinado e oferece as operações usadas pelas
//! interfaces (web e linha de comando):
//!
//! 1. **Sentença avulsa**: tokeniza texto livre, decodifica e devolve pares `palavra/TAG`.
//! 2. **Arquivo**: decodifica cada linha (já tokenizada) em paralelo com Rayon.
//! 3. **Acurácia**: decodifica as sentenças e compara com as respostas.
//!
//! O modelo é congelado antes de qualquer decodificação, então o pipeline pode ser
//! compartilhado entre threads (`Arc<PosPipeline>`) sem locks.

use std::path::Path;

use rayon::prelude::*;
use tracing::info;

use crate::corpus::{demo_corpus, load_pairs_from_files};
use crate::error::Result;
use crate::evaluation::{self, Accuracy};
use crate::hmm::{HmmModel, ModelTrainer};
use crate::tagset::TaggedWord;
use crate::tokenizer::{tokenize_with_mode, Token, TokenizerMode};
use crate::viterbi::{viterbi_decode, viterbi_trace, ViterbiResult};

/// O pipeline POS principal.
#[derive(Debug, Clone)]
pub struct PosPipeline {
    model: HmmModel,
}

impl PosPipeline {
    pub fn new(model: HmmModel) -> Self {
        Self { model }
    }

    /// Treina sobre o corpus de demonstração embutido.
    pub fn demo(trainer: &ModelTrainer) -> Result<Self> {
        let model = trainer.train(&demo_corpus())?;
        Ok(Self::new(model))
    }

    /// Treina a partir dos arquivos paralelos de sentenças e tags.
    pub fn from_files<P, Q>(trainer: &ModelTrainer, sentences: P, tags: Q) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let corpus = load_pairs_from_files(sentences, tags)?;
        let model = trainer.train(&corpus.pairs)?;
        Ok(Self::new(model))
    }

    pub fn model(&self) -> &HmmModel {
        &self.model
    }

    /// Decodifica uma sentença já tokenizada.
    pub fn decode<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<String>> {
        viterbi_decode(&self.model, words)
    }

    /// Tokeniza e etiqueta texto livre.
    pub fn tag_sentence(&self, text: &str, mode: TokenizerMode) -> Result<Vec<TaggedWord>> {
        let tokens = tokenize_with_mode(text, mode);
        let tags = viterbi_decode(&self.model, &token_texts(&tokens))?;
        Ok(zip_tagged(tokens, tags))
    }

    /// Como [`tag_sentence`](Self::tag_sentence), devolvendo também a tabela do Viterbi.
    pub fn trace_sentence(
        &self,
        text: &str,
        mode: TokenizerMode,
    ) -> Result<(Vec<TaggedWord>, ViterbiResult)> {
        let tokens = tokenize_with_mode(text, mode);
        let result = viterbi_trace(&self.model, &token_texts(&tokens))?;
        let tagged = zip_tagged(tokens, result.best_sequence.clone());
        Ok((tagged, result))
    }

    /// Decodifica cada linha de um arquivo de sentenças, preservando a ordem.
    ///
    /// Cada sentença tem seu próprio resultado: uma linha que falha não afeta as demais.
    pub fn tag_lines(&self, lines: &[Vec<String>]) -> Vec<Result<Vec<String>>> {
        let results: Vec<Result<Vec<String>>> = lines
            .par_iter()
            .map(|words| viterbi_decode(&self.model, words))
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(sentences = lines.len(), failed, "arquivo etiquetado");
        results
    }

    /// Decodifica as sentenças e mede a acurácia contra as respostas.
    pub fn evaluate(&self, sentences: &[Vec<String>], answers: &[Vec<String>]) -> Result<Accuracy> {
        let predictions = self.tag_lines(sentences);
        evaluation::evaluate(&predictions, answers)
    }
}

fn token_texts(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

fn zip_tagged(tokens: Vec<Token>, tags: Vec<String>) -> Vec<TaggedWord> {
    tokens
        .into_iter()
        .zip(tags)
        .map(|(token, tag)| TaggedWord {
            word: token.text,
            tag,
            index: token.index,
        })
        .collect()
}
