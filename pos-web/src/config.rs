//! Configuração do servidor.
//!
//! Ordem de precedência: valores padrão → arquivo JSON apontado por `POS_CONFIG`
//! → variáveis de ambiente (`POS_BIND_ADDR`, `POS_TRAIN_SENTENCES`,
//! `POS_TRAIN_TAGS`, `POS_UNSEEN_PENALTY`).

use std::error::Error;
use std::path::{Path, PathBuf};

use pos_core::hmm::{ModelTrainer, UNSEEN_EMISSION_PENALTY};
use pos_core::PosPipeline;
use serde::Deserialize;
use tracing::info;

pub type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Endereço de escuta (ex: "0.0.0.0:3000").
    pub bind_addr: String,
    /// Arquivo de sentenças de treino (uma por linha, tokens separados por espaço).
    pub train_sentences: Option<PathBuf>,
    /// Arquivo de tags de treino, alinhado linha a linha com as sentenças.
    pub train_tags: Option<PathBuf>,
    /// Score (log10) para pares palavra/tag nunca vistos.
    pub unseen_penalty: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            train_sentences: None,
            train_tags: None,
            unseen_penalty: UNSEEN_EMISSION_PENALTY,
        }
    }
}

impl ServerConfig {
    /// Carrega a configuração do arquivo (se houver) e do ambiente.
    pub fn load() -> Result<Self, BoxError> {
        let mut config = match std::env::var_os("POS_CONFIG") {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BoxError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Aplica sobrescritas vindas de `var` (normalmente o ambiente do processo).
    pub fn apply_overrides<F>(&mut self, var: F) -> Result<(), BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = var("POS_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(path) = var("POS_TRAIN_SENTENCES") {
            self.train_sentences = Some(PathBuf::from(path));
        }
        if let Some(path) = var("POS_TRAIN_TAGS") {
            self.train_tags = Some(PathBuf::from(path));
        }
        if let Some(penalty) = var("POS_UNSEEN_PENALTY") {
            self.unseen_penalty = penalty.trim().parse()?;
        }
        Ok(())
    }

    /// Treina o modelo conforme a configuração.
    ///
    /// Sem arquivos de treino, usa o corpus de demonstração embutido.
    pub fn build_pipeline(&self) -> Result<PosPipeline, BoxError> {
        let trainer = ModelTrainer::new().with_unseen_penalty(self.unseen_penalty)?;

        let pipeline = match (&self.train_sentences, &self.train_tags) {
            (Some(sentences), Some(tags)) => {
                info!(sentences = %sentences.display(), tags = %tags.display(), "treinando a partir de arquivos");
                PosPipeline::from_files(&trainer, sentences, tags)?
            }
            (None, None) => {
                info!("nenhum corpus configurado; usando o corpus de demonstração");
                PosPipeline::demo(&trainer)?
            }
            _ => {
                return Err("POS_TRAIN_SENTENCES e POS_TRAIN_TAGS devem ser informados juntos".into());
            }
        };
        Ok(pipeline)
    }
}
