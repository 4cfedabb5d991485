//! # Algoritmo de Viterbi — Decodificação de Sequências HMM
//!
//! O algoritmo de Viterbi é um método de **programação dinâmica** que encontra
//! a sequência de tags mais provável sem enumerar todas as `T^N` combinações.
//!
//! ## Algoritmo
//!
//! ```text
//! Inicialização: v[0][t]  = trans(Start, t) + emit(w_0, t)
//!
//! Recursão:      v[i][t]  = max_{t'} [v[i-1][t'] + trans(t', t)] + emit(w_i, t)
//!
//! Backtracking:  reconstrói o caminho ótimo de trás pra frente pelos backpointers
//! ```
//!
//! Os scores estão em log10, então custos somam. Apenas transições **observadas**
//! geram hipóteses: uma tag sem linha de transição é um beco sem saída. Se todas as
//! hipóteses de um estágio morrem, a decodificação falha com [`PosError::NoPathFound`].
//!
//! ## Desempate
//!
//! Os estágios são `BTreeMap`s, logo predecessores e candidatos finais são visitados
//! em ordem lexicográfica de rótulo. Um candidato só substitui o atual com `>` estrito:
//! em empate exato, vence a tag de **menor rótulo**.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PosError, Result};
use crate::hmm::HmmModel;
use crate::tagset::{normalize_word, Tag};

/// Estado do Viterbi em um instante (para visualização passo a passo)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViterbiStep {
    /// Índice da palavra sendo processada
    pub token_index: usize,
    /// Palavra normalizada
    pub word: String,
    /// Scores acumulados de cada tag viva neste passo
    pub scores: Vec<TagScore>,
    /// A tag com maior score neste passo
    pub best_tag: String,
    /// Score do melhor caminho até aqui
    pub best_score: f64,
}

/// Score de uma tag individual no Viterbi
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagScore {
    /// Rótulo da tag (ex: "N")
    pub tag: String,
    /// Score acumulado até este passo com esta tag
    pub score: f64,
    /// Tag anterior que gerou este score ótimo (`<START>` no primeiro passo)
    pub best_prev: String,
    /// Score de emissão neste passo
    pub emission: f64,
    /// Score de transição da tag anterior para esta
    pub transition: f64,
}

/// Resultado completo do Viterbi
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViterbiResult {
    /// Sequência de tags mais provável (uma por palavra)
    pub best_sequence: Vec<String>,
    /// Log-score da melhor sequência
    pub best_score: f64,
    /// Tabela completa de scores
    pub steps: Vec<ViterbiStep>,
}

/// Célula da treliça: melhor score que termina nesta tag e seu backpointer.
#[derive(Debug, Clone)]
struct Cell {
    score: f64,
    prev: Tag,
    emission: f64,
    transition: f64,
}

type Stage = BTreeMap<Tag, Cell>;

/// Decodifica uma sentença, devolvendo uma tag por palavra.
///
/// # Erros
/// - [`PosError::EmptySentence`] se `words` for vazio.
/// - [`PosError::NoPathFound`] se todas as hipóteses morrerem antes da última palavra.
pub fn viterbi_decode<S: AsRef<str>>(model: &HmmModel, words: &[S]) -> Result<Vec<String>> {
    let lattice = build_lattice(model, words)?;
    let (path, score) = backtrack(&lattice)?;
    debug!(words = words.len(), score, "sentença decodificada");
    Ok(path)
}

/// Como [`viterbi_decode`], mas devolve também a tabela de scores de cada passo.
pub fn viterbi_trace<S: AsRef<str>>(model: &HmmModel, words: &[S]) -> Result<ViterbiResult> {
    let lattice = build_lattice(model, words)?;
    let (best_sequence, best_score) = backtrack(&lattice)?;

    let steps = lattice
        .iter()
        .enumerate()
        .map(|(i, stage)| {
            let (best_tag, best_score) = best_in_stage(stage)
                .map(|(tag, cell)| (tag.to_string(), cell.score))
                .unwrap_or_else(|| (String::new(), f64::NEG_INFINITY));
            ViterbiStep {
                token_index: i,
                word: normalize_word(words[i].as_ref()),
                scores: stage
                    .iter()
                    .map(|(tag, cell)| TagScore {
                        tag: tag.to_string(),
                        score: cell.score,
                        best_prev: cell.prev.to_string(),
                        emission: cell.emission,
                        transition: cell.transition,
                    })
                    .collect(),
                best_tag,
                best_score,
            }
        })
        .collect();

    Ok(ViterbiResult {
        best_sequence,
        best_score,
        steps,
    })
}

/// Passo para frente: um estágio por palavra.
fn build_lattice<S: AsRef<str>>(model: &HmmModel, words: &[S]) -> Result<Vec<Stage>> {
    if words.is_empty() {
        return Err(PosError::EmptySentence);
    }

    let words: Vec<String> = words.iter().map(|w| normalize_word(w.as_ref())).collect();
    let mut lattice: Vec<Stage> = Vec::with_capacity(words.len());

    // === Inicialização (palavra 0) ===
    let mut first = Stage::new();
    if let Some(row) = model.successors(&Tag::Start) {
        for (tag, &transition) in row {
            let emission = model.emission_score(&words[0], tag);
            first.insert(
                Tag::Label(tag.clone()),
                Cell {
                    score: transition + emission,
                    prev: Tag::Start,
                    emission,
                    transition,
                },
            );
        }
    }
    if first.is_empty() {
        return Err(PosError::NoPathFound { position: 0 });
    }
    lattice.push(first);

    // === Recursão (palavras 1..N-1) ===
    for (i, word) in words.iter().enumerate().skip(1) {
        let previous = &lattice[i - 1];
        let mut stage = Stage::new();

        for (prev_tag, prev_cell) in previous {
            // Tag sem transições observadas: beco sem saída
            let Some(row) = model.successors(prev_tag) else {
                continue;
            };

            for (next, &transition) in row {
                let emission = model.emission_score(word, next);
                let candidate = prev_cell.score + transition + emission;
                let cell = Cell {
                    score: candidate,
                    prev: prev_tag.clone(),
                    emission,
                    transition,
                };

                match stage.entry(Tag::Label(next.clone())) {
                    Entry::Vacant(slot) => {
                        slot.insert(cell);
                    }
                    Entry::Occupied(mut slot) => {
                        if candidate > slot.get().score {
                            slot.insert(cell);
                        }
                    }
                }
            }
        }

        if stage.is_empty() {
            debug!(position = i, "todas as hipóteses morreram");
            return Err(PosError::NoPathFound { position: i });
        }
        lattice.push(stage);
    }

    Ok(lattice)
}

/// Escolhe o melhor estado final e segue os backpointers até o início.
fn backtrack(lattice: &[Stage]) -> Result<(Vec<String>, f64)> {
    let last = lattice.len().saturating_sub(1);
    let (best_last, best_cell) = lattice
        .last()
        .and_then(best_in_stage)
        .ok_or(PosError::NoPathFound { position: last })?;
    let best_score = best_cell.score;

    let mut path = Vec::with_capacity(lattice.len());
    let mut current = best_last.clone();

    for (position, stage) in lattice.iter().enumerate().rev() {
        let cell = stage
            .get(&current)
            .ok_or(PosError::NoPathFound { position })?;
        path.push(current.to_string());
        current = cell.prev.clone();
    }

    path.reverse();
    Ok((path, best_score))
}

/// Melhor (tag, célula) de um estágio; empates ficam com o menor rótulo.
fn best_in_stage(stage: &Stage) -> Option<(&Tag, &Cell)> {
    let mut best: Option<(&Tag, &Cell)> = None;
    for (tag, cell) in stage {
        match best {
            Some((_, current)) if cell.score <= current.score => {}
            _ => best = Some((tag, cell)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{demo_corpus, TrainingPair};
    use crate::hmm::train;

    fn dog_runs_model() -> HmmModel {
        train(&[TrainingPair::new(["the", "dog", "runs"], ["DET", "N", "V"])]).unwrap()
    }

    #[test]
    fn test_viterbi_single_path() {
        let model = dog_runs_model();
        let tags = viterbi_decode(&model, &["the", "dog", "runs"]).unwrap();
        assert_eq!(tags, vec!["DET", "N", "V"]);
    }

    #[test]
    fn test_viterbi_case_insensitive_input() {
        let model = dog_runs_model();
        let tags = viterbi_decode(&model, &["The", "DOG", "Runs"]).unwrap();
        assert_eq!(tags, vec!["DET", "N", "V"]);
    }

    #[test]
    fn test_viterbi_unknown_word() {
        let model = dog_runs_model();
        // "cat" nunca foi visto: recebe a penalidade, mas a sequência sai completa
        let tags = viterbi_decode(&model, &["the", "cat", "runs"]).unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags, vec!["DET", "N", "V"]);
    }

    #[test]
    fn test_viterbi_empty() {
        let model = dog_runs_model();
        let words: [&str; 0] = [];
        assert!(matches!(
            viterbi_decode(&model, &words),
            Err(PosError::EmptySentence)
        ));
        assert!(matches!(
            viterbi_trace(&model, &words),
            Err(PosError::EmptySentence)
        ));
    }

    #[test]
    fn test_viterbi_dead_end_is_no_path() {
        // V não tem transições: a quarta palavra não tem hipótese
        let model = dog_runs_model();
        let result = viterbi_decode(&model, &["the", "dog", "runs", "fast"]);
        assert!(matches!(result, Err(PosError::NoPathFound { position: 3 })));
    }

    #[test]
    fn test_viterbi_final_tie_prefers_smallest_label() {
        let pairs = vec![
            TrainingPair::new(["fish"], ["V"]),
            TrainingPair::new(["fish"], ["N"]),
        ];
        let model = train(&pairs).unwrap();
        assert_eq!(viterbi_decode(&model, &["fish"]).unwrap(), vec!["N"]);
    }

    #[test]
    fn test_viterbi_predecessor_tie_prefers_smallest_label() {
        let pairs = vec![
            TrainingPair::new(["w", "z"], ["B", "C"]),
            TrainingPair::new(["w", "z"], ["A", "C"]),
        ];
        let model = train(&pairs).unwrap();

        let trace = viterbi_trace(&model, &["w", "z"]).unwrap();
        assert_eq!(trace.best_sequence, vec!["A", "C"]);
        assert_eq!(trace.steps[1].scores[0].best_prev, "A");
    }

    #[test]
    fn test_viterbi_prefers_higher_probability_path() {
        let pairs = vec![
            TrainingPair::new(["they", "fish"], ["PRO", "V"]),
            TrainingPair::new(["we", "fish"], ["PRO", "V"]),
            TrainingPair::new(["the", "fish"], ["DET", "N"]),
        ];
        let model = train(&pairs).unwrap();

        assert_eq!(viterbi_decode(&model, &["they", "fish"]).unwrap(), vec!["PRO", "V"]);
        assert_eq!(viterbi_decode(&model, &["the", "fish"]).unwrap(), vec!["DET", "N"]);
    }

    #[test]
    fn test_viterbi_deterministic_and_length_preserving() {
        let corpus = demo_corpus();
        let model = train(&corpus).unwrap();

        for pair in &corpus {
            let first = viterbi_decode(&model, &pair.words).unwrap();
            let second = viterbi_decode(&model, &pair.words).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.len(), pair.words.len());
        }
    }

    #[test]
    fn test_viterbi_retained_score_is_max_candidate() {
        let model = train(&demo_corpus()).unwrap();
        let words = ["the", "old", "dog", "saw", "a", "new", "house", "."];
        let trace = viterbi_trace(&model, &words).unwrap();

        for i in 1..trace.steps.len() {
            for current in &trace.steps[i].scores {
                for prev in &trace.steps[i - 1].scores {
                    if let Some(t) = model.transition(&Tag::label(&prev.tag), &current.tag) {
                        let candidate = prev.score + t + current.emission;
                        assert!(current.score >= candidate);
                    }
                }
            }
        }
    }

    #[test]
    fn test_viterbi_result_serializes() {
        let trace = viterbi_trace(&dog_runs_model(), &["the", "dog"]).unwrap();
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["best_sequence"], serde_json::json!(["DET", "N"]));
        assert_eq!(json["steps"][1]["scores"][0]["best_prev"], "DET");
    }

    #[test]
    fn test_viterbi_trace_matches_decode() {
        let model = dog_runs_model();
        let trace = viterbi_trace(&model, &["the", "dog", "runs"]).unwrap();

        assert_eq!(trace.best_sequence, vec!["DET", "N", "V"]);
        assert_eq!(trace.best_score, 0.0);
        assert_eq!(trace.steps.len(), 3);
        assert_eq!(trace.steps[0].scores[0].best_prev, "<START>");
        assert_eq!(trace.steps[2].best_tag, "V");
    }
}
