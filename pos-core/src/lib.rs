//! # pos-core — Etiquetador Morfossintático (POS) com HMM
//!
//! Este crate aprende um **Hidden Markov Model de primeira ordem** a partir de um corpus
//! de pares (palavras, tags) e etiqueta novas sentenças com o **algoritmo de Viterbi**.
//!
//! ## Arquitetura do Sistema
//!
//! O modelo é treinado uma única vez e depois consultado quantas vezes for preciso:
//!
//! 1.  **Corpus** ([`corpus`]): leitura das fontes paralelas de sentenças e tags.
//! 2.  **Treinamento** ([`hmm`]): contagem de ocorrências, emissões e transições,
//!     convertidas em log10-probabilidades. O resultado é um [`HmmModel`] imutável.
//! 3.  **Decodificação** ([`viterbi`]): programação dinâmica sobre as hipóteses de tag,
//!     com backpointers para reconstruir o melhor caminho.
//! 4.  **Avaliação** ([`evaluation`]): acurácia contra um arquivo de respostas.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use pos_core::{corpus::TrainingPair, hmm::ModelTrainer, viterbi::viterbi_decode};
//!
//! // 1. Treina com pares alinhados
//! let pairs = vec![
//!     TrainingPair::new(["the", "dog", "runs"], ["DET", "N", "V"]),
//!     TrainingPair::new(["a", "cat", "sleeps"], ["DET", "N", "V"]),
//! ];
//! let model = ModelTrainer::new().train(&pairs).unwrap();
//!
//! // 2. Decodifica uma sentença nova (palavras desconhecidas recebem penalidade fixa)
//! let tags = viterbi_decode(&model, &["the", "cat", "jumps"]).unwrap();
//! assert_eq!(tags, vec!["DET", "N", "V"]);
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: fachada usada pelas interfaces web e de linha de comando.
//! - [`tokenizer`]: segmentação de texto livre.
//! - [`tagset`]: tipo [`Tag`] e guia do conjunto de tags.
//! - [`error`]: taxonomia de falhas ([`PosError`]).

pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod hmm;
pub mod pipeline;
pub mod tagset;
pub mod tokenizer;
pub mod viterbi;

pub use error::{PosError, Result};
pub use hmm::{HmmModel, ModelTrainer};
pub use pipeline::PosPipeline;
pub use tagset::{Tag, TaggedWord};
pub use tokenizer::{Token, TokenizerMode};
