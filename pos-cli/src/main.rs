mod repl;

use std::error::Error;
use std::fs::File;
use std::io::{self, prelude::*, stdin, BufWriter};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pos_core::corpus::read_lines_from_file;
use pos_core::evaluation::evaluate;
use pos_core::hmm::{ModelTrainer, UNSEEN_EMISSION_PENALTY};
use pos_core::tagset::{render, TAG_GUIDE};
use pos_core::{PosPipeline, TokenizerMode};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::repl::Repl;

#[derive(Parser, Debug)]
#[command(
    name = "pos",
    about = "A part-of-speech tagger based on a first-order HMM and Viterbi decoding."
)]
struct Opt {
    #[command(flatten)]
    training: TrainingOpt,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct TrainingOpt {
    /// Training sentences, one whitespace-tokenized sentence per line.
    /// Without training files the embedded demo corpus is used.
    #[arg(long, requires = "train_tags")]
    train_sentences: Option<PathBuf>,

    /// Training tags, aligned line by line with the sentences.
    #[arg(long, requires = "train_sentences")]
    train_tags: Option<PathBuf>,

    /// Log10 score for word/tag pairs never seen in training.
    #[arg(long, default_value_t = UNSEEN_EMISSION_PENALTY, allow_negative_numbers = true)]
    unseen_penalty: f64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tags every line of a sentence file and prints one tag line per sentence.
    Tag {
        /// Whitespace-tokenized sentence file.
        #[arg(long)]
        input: PathBuf,

        /// Output file (standard output when omitted).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Tags a single free-text sentence and prints word/TAG pairs.
    Sentence {
        /// The sentence; read from standard input when omitted.
        text: Vec<String>,
    },

    /// Tags a sentence file and reports accuracy against an answer file.
    Evaluate {
        #[arg(long)]
        input: PathBuf,

        /// Reference tags, aligned line by line with the input.
        #[arg(long)]
        answers: PathBuf,
    },

    /// Prints the part-of-speech guide.
    Tagset,

    /// Interactive command loop.
    Repl,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let opt = Opt::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match opt.command {
        Command::Tagset => print_tag_guide(&mut out)?,
        Command::Tag { input, output } => {
            let pipeline = build_pipeline(&opt.training)?;
            let lines = read_lines_from_file(input)?;
            let results = pipeline.tag_lines(&lines);

            let mut writer: Box<dyn Write> = match output {
                Some(path) => Box::new(BufWriter::new(File::create(path)?)),
                None => Box::new(BufWriter::new(out)),
            };
            for (i, result) in results.iter().enumerate() {
                match result {
                    Ok(tags) => writeln!(writer, "{}", tags.join(" "))?,
                    Err(e) => {
                        warn!(line = i + 1, "{e}");
                        writeln!(writer)?;
                    }
                }
            }
            writer.flush()?;
        }
        Command::Sentence { text } => {
            let pipeline = build_pipeline(&opt.training)?;
            let text = if text.is_empty() {
                let mut buf = String::new();
                stdin().read_line(&mut buf)?;
                buf
            } else {
                text.join(" ")
            };
            let tagged = pipeline.tag_sentence(&text, TokenizerMode::Standard)?;
            writeln!(out, "{}", render(&tagged))?;
        }
        Command::Evaluate { input, answers } => {
            let pipeline = build_pipeline(&opt.training)?;
            let lines = read_lines_from_file(input)?;
            let answers = read_lines_from_file(answers)?;
            let accuracy = evaluate(&pipeline.tag_lines(&lines), &answers)?;
            write!(out, "{accuracy}")?;
        }
        Command::Repl => {
            let pipeline = build_pipeline(&opt.training)?;
            Repl::new(&pipeline).run(stdin().lock(), &mut out)?;
        }
    }

    Ok(())
}

fn build_pipeline(opt: &TrainingOpt) -> Result<PosPipeline, Box<dyn Error>> {
    let trainer = ModelTrainer::new().with_unseen_penalty(opt.unseen_penalty)?;
    let pipeline = match (&opt.train_sentences, &opt.train_tags) {
        (Some(sentences), Some(tags)) => PosPipeline::from_files(&trainer, sentences, tags)?,
        _ => PosPipeline::demo(&trainer)?,
    };
    Ok(pipeline)
}

fn print_tag_guide<W: Write>(out: &mut W) -> io::Result<()> {
    for info in TAG_GUIDE {
        writeln!(out, "{}\t{}\t{}", info.label, info.name, info.examples)?;
    }
    Ok(())
}
