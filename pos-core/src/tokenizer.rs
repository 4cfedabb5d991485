//! # Tokenizador
//!
//! Divide o texto em palavras antes da etiquetagem. Cada token preserva sua posição
//! original (offset em bytes) para que a interface possa destacar as palavras.
//!
//! ## Modos
//!
//! - **Whitespace**: separa apenas por espaços. É o formato dos arquivos de corpus,
//!   que já vêm tokenizados (`the dog runs .`).
//! - **Standard**: usa as fronteiras de palavra Unicode (UAX #29), separando a
//!   pontuação das palavras em texto livre (`"runs."` → `"runs"`, `"."`).
//!
//! ```rust
//! use pos_core::tokenizer::{tokenize_with_mode, TokenizerMode};
//!
//! let tokens = tokenize_with_mode("The dog runs.", TokenizerMode::Standard);
//! let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(words, vec!["The", "dog", "runs", "."]);
//! ```

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Um token extraído do texto original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "dog", ",").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

/// Estratégias de tokenização disponíveis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerMode {
    /// Fronteiras de palavra Unicode; pontuação vira token próprio.
    #[default]
    Standard,
    /// Apenas espaços em branco (texto pré-tokenizado).
    Whitespace,
}

/// Tokeniza um texto usando o modo padrão.
pub fn tokenize(text: &str) -> Vec<Token> {
    tokenize_with_mode(text, TokenizerMode::Standard)
}

/// Tokeniza um texto com o modo especificado.
pub fn tokenize_with_mode(text: &str, mode: TokenizerMode) -> Vec<Token> {
    let pieces: Vec<(usize, &str)> = match mode {
        TokenizerMode::Standard => text
            .split_word_bound_indices()
            .filter(|(_, piece)| !piece.trim().is_empty())
            .collect(),
        TokenizerMode::Whitespace => whitespace_indices(text),
    };

    pieces
        .into_iter()
        .enumerate()
        .map(|(index, (start, piece))| Token {
            text: piece.to_string(),
            start,
            end: start + piece.len(),
            index,
        })
        .collect()
}

/// Palavras de um texto (apenas o texto dos tokens).
pub fn words(text: &str, mode: TokenizerMode) -> Vec<String> {
    tokenize_with_mode(text, mode)
        .into_iter()
        .map(|t| t.text)
        .collect()
}

fn whitespace_indices(text: &str) -> Vec<(usize, &str)> {
    let mut pieces = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                pieces.push((s, &text[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        pieces.push((s, &text[s..]));
    }
    pieces
}
