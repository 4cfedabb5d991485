//! Laço interativo de comandos.
//!
//! ```text
//! f >> etiquetar um arquivo
//! i >> etiquetar uma sentença digitada
//! a >> acurácia do último arquivo etiquetado
//! t >> guia de tags
//! q >> sair
//! ```
//!
//! O estado (predições do último arquivo) pertence ao [`Repl`], não a variáveis globais.

use std::error::Error;
use std::io::{BufRead, Write};

use pos_core::corpus::read_lines_from_file;
use pos_core::evaluation::evaluate;
use pos_core::tagset::render;
use pos_core::{PosPipeline, Result as PosResult, TokenizerMode};

use crate::print_tag_guide;

const MENU: &str = "f >> Tag a file\ni >> Tag your own sentence\na >> Tagging accuracy (files only)\nt >> Part-of-speech guide\nq >> Quit\nEnter command >>";

pub struct Repl<'a> {
    pipeline: &'a PosPipeline,
    /// Predições do último arquivo etiquetado com `f`.
    last_file: Option<Vec<PosResult<Vec<String>>>>,
}

impl<'a> Repl<'a> {
    pub fn new(pipeline: &'a PosPipeline) -> Self {
        Self {
            pipeline,
            last_file: None,
        }
    }

    /// Lê comandos de `input` até `q` ou fim da entrada.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> Result<(), Box<dyn Error>> {
        loop {
            writeln!(out, "{MENU}")?;
            let Some(command) = read_line(&mut input)? else {
                return Ok(());
            };

            match command.as_str() {
                "f" => {
                    writeln!(out, "Enter file name to tag >>")?;
                    let Some(path) = read_line(&mut input)? else { return Ok(()) };
                    self.tag_file(&path, out)?;
                }
                "i" => {
                    writeln!(out, "Enter sentence >>")?;
                    let Some(sentence) = read_line(&mut input)? else { return Ok(()) };
                    match self.pipeline.tag_sentence(&sentence, TokenizerMode::Standard) {
                        Ok(tagged) => writeln!(out, "{}", render(&tagged))?,
                        Err(e) => writeln!(out, "error: {e}")?,
                    }
                }
                "a" => {
                    writeln!(out, "Tag verifier file name >>")?;
                    let Some(path) = read_line(&mut input)? else { return Ok(()) };
                    self.accuracy(&path, out)?;
                }
                "t" => print_tag_guide(out)?,
                "q" => {
                    writeln!(out, "Bye!")?;
                    return Ok(());
                }
                _ => writeln!(out, "Invalid command")?,
            }
        }
    }

    fn tag_file<W: Write>(&mut self, path: &str, out: &mut W) -> Result<(), Box<dyn Error>> {
        let lines = match read_lines_from_file(path) {
            Ok(lines) => lines,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                return Ok(());
            }
        };

        let results = self.pipeline.tag_lines(&lines);
        for result in &results {
            match result {
                Ok(tags) => writeln!(out, "{}", tags.join(" "))?,
                Err(e) => writeln!(out, "error: {e}")?,
            }
        }
        self.last_file = Some(results);
        Ok(())
    }

    fn accuracy<W: Write>(&self, path: &str, out: &mut W) -> Result<(), Box<dyn Error>> {
        let Some(predictions) = &self.last_file else {
            writeln!(out, "Tag a file first (command f)")?;
            return Ok(());
        };

        let report = read_lines_from_file(path).and_then(|answers| evaluate(predictions, &answers));
        match report {
            Ok(accuracy) => write!(out, "{accuracy}")?,
            Err(e) => writeln!(out, "error: {e}")?,
        }
        Ok(())
    }
}

fn read_line<R: BufRead>(input: &mut R) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
