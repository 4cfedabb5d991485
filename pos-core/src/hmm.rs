//! # Hidden Markov Model (HMM) para Etiquetagem POS
//!
//! Implementação clássica de HMM de primeira ordem onde:
//! - **Estados Ocultos**: Tags morfossintáticas (N, V, DET, ...)
//! - **Observações**: Palavras
//!
//! O modelo aprende, por contagem de frequências:
//! 1. Ocorrências de cada tag: `count(T)`
//! 2. Emissão: `P(palavra | T) = count(palavra, T) / count(T)`
//! 3. Transição: `P(T' | T) = count(T, T') / count(T)`, incluindo a sentinela
//!    [`Tag::Start`], normalizada pelo número de sentenças.
//!
//! Tudo é armazenado em **log10** para que a decodificação some custos em vez de
//! multiplicar probabilidades pequenas:
//! $$ \log(A \cdot B) = \log(A) + \log(B) $$
//!
//! ## Sem suavização aditiva
//!
//! Pares nunca observados **não** são armazenados. Na decodificação, uma emissão
//! ausente recebe a penalidade fixa [`UNSEEN_EMISSION_PENALTY`]; uma transição
//! ausente simplesmente não gera hipótese.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::corpus::TrainingPair;
use crate::error::{PosError, Result};
use crate::tagset::{normalize_tag, normalize_word, Tag};

/// Score (log10) atribuído a um par (palavra, tag) nunca visto no treino.
///
/// Muito improvável, mas não impossível: palavras fora do vocabulário ainda
/// recebem uma tag guiada apenas pelas transições.
pub const UNSEEN_EMISSION_PENALTY: f64 = -100.0;

/// Modelo HMM treinado e congelado.
///
/// Não existe método `&mut self`: depois de [`ModelTrainer::train`] o modelo é
/// somente leitura, podendo ser compartilhado entre threads (ex: via `Arc`) sem locks.
#[derive(Debug, Clone)]
pub struct HmmModel {
    /// `count(T)` por rótulo de tag.
    tag_counts: BTreeMap<String, u32>,
    /// Quantidade de sentenças ingeridas (denominador da linha `Start`).
    sentence_starts: u32,
    /// `palavra → (tag → log10 P(palavra | tag))`.
    emissions: HashMap<String, HashMap<String, f64>>,
    /// `tag → (próxima tag → log10 P(próxima | tag))`. `BTreeMap` garante ordem de iteração definida.
    transitions: BTreeMap<Tag, BTreeMap<String, f64>>,
    unseen_penalty: f64,
}

/// Resumo numérico do modelo (para logs e para a API web).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub sentences: u32,
    pub tags: usize,
    pub vocabulary: usize,
    pub transitions: usize,
    pub emissions: usize,
    pub unseen_penalty: f64,
}

/// Contabilidade de um treinamento.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Pares usados.
    pub ingested: usize,
    /// Pares descartados (desalinhados ou vazios).
    pub skipped: usize,
}

impl HmmModel {
    /// Ocorrências da tag no corpus (0 se nunca vista).
    pub fn tag_count(&self, tag: &str) -> u32 {
        self.tag_counts.get(&normalize_tag(tag)).copied().unwrap_or(0)
    }

    /// Número de sentenças usadas no treino.
    pub fn sentence_starts(&self) -> u32 {
        self.sentence_starts
    }

    /// Rótulos de todas as tags conhecidas, em ordem lexicográfica.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tag_counts.keys().map(String::as_str)
    }

    /// `log10 P(palavra | tag)` se o par foi observado.
    pub fn emission(&self, word: &str, tag: &str) -> Option<f64> {
        self.emissions
            .get(&normalize_word(word))
            .and_then(|row| row.get(&normalize_tag(tag)))
            .copied()
    }

    /// `log10 P(to | from)` se a transição foi observada.
    pub fn transition(&self, from: &Tag, to: &str) -> Option<f64> {
        self.transitions
            .get(from)
            .and_then(|row| row.get(&normalize_tag(to)))
            .copied()
    }

    /// Quantas tags diferentes a palavra recebeu no treino.
    pub fn tags_for_word(&self, word: &str) -> usize {
        self.emissions
            .get(&normalize_word(word))
            .map_or(0, HashMap::len)
    }

    pub fn unseen_penalty(&self) -> f64 {
        self.unseen_penalty
    }

    pub fn vocabulary_size(&self) -> usize {
        self.emissions.len()
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            sentences: self.sentence_starts,
            tags: self.tag_counts.len(),
            vocabulary: self.emissions.len(),
            transitions: self.transitions.values().map(BTreeMap::len).sum(),
            emissions: self.emissions.values().map(HashMap::len).sum(),
            unseen_penalty: self.unseen_penalty,
        }
    }

    /// Linha de transições de uma tag (usada pelo Viterbi).
    pub(crate) fn successors(&self, from: &Tag) -> Option<&BTreeMap<String, f64>> {
        self.transitions.get(from)
    }

    /// Score de emissão para palavra e tag **já normalizadas**, com penalidade para pares não vistos.
    pub(crate) fn emission_score(&self, word: &str, tag: &str) -> f64 {
        self.emissions
            .get(word)
            .and_then(|row| row.get(tag))
            .copied()
            .unwrap_or(self.unseen_penalty)
    }

    /// Itera sobre todas as log-probabilidades armazenadas (transições e emissões).
    pub fn log_probabilities(&self) -> impl Iterator<Item = f64> + '_ {
        self.transitions
            .values()
            .flat_map(|row| row.values().copied())
            .chain(self.emissions.values().flat_map(|row| row.values().copied()))
    }
}

/// Treinador do HMM (Supervised Learning).
///
/// # Processo de Treinamento
/// 1. **Filtragem**: pares com quantidades diferentes de palavras e tags são descartados
///    por inteiro (um alinhamento parcial é pior que nenhum sinal).
/// 2. **Contagem**: para cada par válido, conta o início de sentença, a transição
///    `Start → primeira tag`, as ocorrências de tags, as emissões e as transições.
/// 3. **Log-Probabilidades**: divide cada contagem pela ocorrência da tag de origem e aplica `log10`.
///
/// # Exemplo
/// ```rust
/// use pos_core::corpus::TrainingPair;
/// use pos_core::hmm::ModelTrainer;
///
/// let pairs = vec![TrainingPair::new(["the", "dog", "runs"], ["DET", "N", "V"])];
/// let model = ModelTrainer::new().train(&pairs).unwrap();
/// assert_eq!(model.emission("dog", "N"), Some(0.0));
/// ```
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    unseen_penalty: f64,
}

impl Default for ModelTrainer {
    fn default() -> Self {
        Self {
            unseen_penalty: UNSEEN_EMISSION_PENALTY,
        }
    }
}

impl ModelTrainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Substitui a penalidade de emissão não vista. Precisa ser finita e `<= 0`.
    pub fn with_unseen_penalty(mut self, penalty: f64) -> Result<Self> {
        if !penalty.is_finite() || penalty > 0.0 {
            return Err(PosError::InvalidPenalty(penalty));
        }
        self.unseen_penalty = penalty;
        Ok(self)
    }

    /// Treina o modelo a partir dos pares alinhados.
    pub fn train<'a, I>(&self, pairs: I) -> Result<HmmModel>
    where
        I: IntoIterator<Item = &'a TrainingPair>,
    {
        self.train_with_report(pairs).map(|(model, _)| model)
    }

    /// Como [`train`](Self::train), devolvendo também quantos pares foram usados e descartados.
    pub fn train_with_report<'a, I>(&self, pairs: I) -> Result<(HmmModel, TrainingReport)>
    where
        I: IntoIterator<Item = &'a TrainingPair>,
    {
        let mut tag_counts: BTreeMap<String, u32> = BTreeMap::new();
        let mut emission_counts: HashMap<String, HashMap<String, u32>> = HashMap::new();
        let mut transition_counts: BTreeMap<Tag, BTreeMap<String, u32>> = BTreeMap::new();
        let mut sentence_starts: u32 = 0;
        let mut report = TrainingReport::default();

        // 1. Contagem das frequências brutas
        for (index, pair) in pairs.into_iter().enumerate() {
            if !pair.is_aligned() {
                warn!(
                    pair = index,
                    words = pair.words.len(),
                    tags = pair.tags.len(),
                    "par desalinhado descartado"
                );
                report.skipped += 1;
                continue;
            }
            if pair.is_empty() {
                debug!(pair = index, "par vazio descartado");
                report.skipped += 1;
                continue;
            }

            let tags: Vec<String> = pair.tags.iter().map(|t| normalize_tag(t)).collect();

            // Início de sentença: contador dedicado + transição Start → primeira tag
            sentence_starts += 1;
            *transition_counts
                .entry(Tag::Start)
                .or_default()
                .entry(tags[0].clone())
                .or_insert(0) += 1;

            for (i, (word, tag)) in pair.words.iter().zip(&tags).enumerate() {
                *tag_counts.entry(tag.clone()).or_insert(0) += 1;

                // Emissão: quantas vezes a tag T gerou a palavra W?
                *emission_counts
                    .entry(normalize_word(word))
                    .or_default()
                    .entry(tag.clone())
                    .or_insert(0) += 1;

                // Transição: quantas vezes T foi seguida por T'?
                if let Some(next) = tags.get(i + 1) {
                    *transition_counts
                        .entry(Tag::Label(tag.clone()))
                        .or_default()
                        .entry(next.clone())
                        .or_insert(0) += 1;
                }
            }
            report.ingested += 1;
        }

        if report.ingested == 0 {
            return Err(PosError::EmptyCorpus);
        }

        // 2. Normalização pela ocorrência da tag de origem e conversão para log10
        let occurrence = |from: &Tag| -> f64 {
            match from {
                Tag::Start => sentence_starts as f64,
                Tag::Label(label) => tag_counts.get(label).copied().unwrap_or(0) as f64,
            }
        };

        let transitions: BTreeMap<Tag, BTreeMap<String, f64>> = transition_counts
            .into_iter()
            .map(|(from, row)| {
                let total = occurrence(&from);
                let row = row
                    .into_iter()
                    .map(|(to, count)| (to, (count as f64 / total).log10()))
                    .collect();
                (from, row)
            })
            .collect();

        let emissions: HashMap<String, HashMap<String, f64>> = emission_counts
            .into_iter()
            .map(|(word, row)| {
                let row = row
                    .into_iter()
                    .map(|(tag, count)| {
                        let total = tag_counts.get(&tag).copied().unwrap_or(0) as f64;
                        (tag, (count as f64 / total).log10())
                    })
                    .collect();
                (word, row)
            })
            .collect();

        let model = HmmModel {
            tag_counts,
            sentence_starts,
            emissions,
            transitions,
            unseen_penalty: self.unseen_penalty,
        };

        info!(
            sentences = report.ingested,
            skipped = report.skipped,
            tags = model.tag_counts.len(),
            vocabulary = model.vocabulary_size(),
            "modelo HMM treinado"
        );

        Ok((model, report))
    }
}

/// Atalho para treinar com a configuração padrão.
pub fn train<'a, I>(pairs: I) -> Result<HmmModel>
where
    I: IntoIterator<Item = &'a TrainingPair>,
{
    ModelTrainer::default().train(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog_runs() -> Vec<TrainingPair> {
        vec![TrainingPair::new(["the", "dog", "runs"], ["DET", "N", "V"])]
    }

    #[test]
    fn test_hmm_basic_training() {
        let model = train(&dog_runs()).unwrap();

        assert_eq!(model.tag_count("DET"), 1);
        assert_eq!(model.tag_count("N"), 1);
        assert_eq!(model.tag_count("V"), 1);
        assert_eq!(model.sentence_starts(), 1);

        // log10(1/1) = 0
        assert_eq!(model.emission("dog", "N"), Some(0.0));
        assert_eq!(model.transition(&Tag::label("DET"), "N"), Some(0.0));
        assert_eq!(model.transition(&Tag::Start, "DET"), Some(0.0));

        // A última tag não tem linha de transição
        assert!(model.successors(&Tag::label("V")).is_none());
    }

    #[test]
    fn test_hmm_mismatched_pair_contributes_nothing() {
        let pairs = vec![
            TrainingPair::new(["a", "cat"], ["DET"]),
            TrainingPair::new(["the", "dog", "runs"], ["DET", "N", "V"]),
        ];
        let (model, report) = ModelTrainer::new().train_with_report(&pairs).unwrap();

        assert_eq!(report, TrainingReport { ingested: 1, skipped: 1 });
        assert_eq!(model.sentence_starts(), 1);
        assert_eq!(model.tag_count("DET"), 1);
        // Palavras do par descartado nunca entram no vocabulário
        assert_eq!(model.tags_for_word("a"), 0);
        assert_eq!(model.tags_for_word("cat"), 0);
        assert_eq!(model.vocabulary_size(), 3);
    }

    #[test]
    fn test_hmm_empty_corpus() {
        let pairs: Vec<TrainingPair> = vec![];
        assert!(matches!(train(&pairs), Err(PosError::EmptyCorpus)));

        let only_bad = vec![TrainingPair::new(["x", "y"], ["N"])];
        assert!(matches!(train(&only_bad), Err(PosError::EmptyCorpus)));
    }

    #[test]
    fn test_hmm_case_insensitive_counts() {
        let pairs = vec![
            TrainingPair::new(["The", "Dog"], ["det", "n"]),
            TrainingPair::new(["the", "DOG"], ["DET", "N"]),
        ];
        let model = train(&pairs).unwrap();

        assert_eq!(model.tag_count("det"), 2);
        assert_eq!(model.tags().collect::<Vec<_>>(), vec!["DET", "N"]);
        assert_eq!(model.emission("dOg", "n"), Some(0.0));
        assert_eq!(model.vocabulary_size(), 2);
    }

    #[test]
    fn test_hmm_start_row_uses_sentence_count() {
        let pairs = vec![
            TrainingPair::new(["dogs", "bark"], ["N", "V"]),
            TrainingPair::new(["the", "dog"], ["DET", "N"]),
            TrainingPair::new(["a", "cat"], ["DET", "N"]),
        ];
        let model = train(&pairs).unwrap();

        let start_det = model.transition(&Tag::Start, "DET").unwrap();
        let start_n = model.transition(&Tag::Start, "N").unwrap();
        assert!((start_det - (2.0f64 / 3.0).log10()).abs() < 1e-12);
        assert!((start_n - (1.0f64 / 3.0).log10()).abs() < 1e-12);

        // N ocorre 3 vezes e é seguida por V uma vez
        let n_v = model.transition(&Tag::label("N"), "V").unwrap();
        assert!((n_v - (1.0f64 / 3.0).log10()).abs() < 1e-12);
        // "dog" emitida por N uma vez em três
        let dog_n = model.emission("dog", "N").unwrap();
        assert!((dog_n - (1.0f64 / 3.0).log10()).abs() < 1e-12);
    }

    #[test]
    fn test_hmm_probabilities_are_valid() {
        let pairs = crate::corpus::demo_corpus();
        let model = train(&pairs).unwrap();

        assert!(model.log_probabilities().count() > 0);
        for p in model.log_probabilities() {
            assert!(p <= 0.0, "log-probabilidade positiva: {p}");
            assert!(p.is_finite());
        }
    }

    #[test]
    fn test_hmm_unseen_penalty_override() {
        let trainer = ModelTrainer::new().with_unseen_penalty(-20.0).unwrap();
        let model = trainer.train(&dog_runs()).unwrap();
        assert_eq!(model.unseen_penalty(), -20.0);
        assert_eq!(model.emission_score("cat", "N"), -20.0);

        assert!(matches!(
            ModelTrainer::new().with_unseen_penalty(1.5),
            Err(PosError::InvalidPenalty(_))
        ));
        assert!(ModelTrainer::new().with_unseen_penalty(f64::NAN).is_err());
    }

    #[test]
    fn test_hmm_summary() {
        let summary = train(&dog_runs()).unwrap().summary();
        assert_eq!(summary.sentences, 1);
        assert_eq!(summary.tags, 3);
        assert_eq!(summary.vocabulary, 3);
        // Start→DET, DET→N, N→V
        assert_eq!(summary.transitions, 3);
        assert_eq!(summary.emissions, 3);
        assert_eq!(summary.unseen_penalty, UNSEEN_EMISSION_PENALTY);
    }
}
