//! # Estado da Aplicação Web
//!
//! Estado compartilhado entre os handlers Axum.
//!
//! ## Inicialização em Duas Fases
//!
//! ```text
//! Fase 1 (imediata):          Fase 2 (background):
//! ┌───────────────────┐       ┌──────────────────────┐
//! │ AppState          │       │ VetorizadorBert      │
//! │  ├── catalogo ✓   │       │ (BERTimbau, ~400 MB) │
//! │  ├── pipeline ✓   │       │  + indexação do      │
//! │  ├── indice ✓     │←──────│    catálogo          │
//! │  └── vetorizador:∅│  set  └──────────────────────┘
//! └───────────────────┘
//! ```
//!
//! O servidor aceita requisições imediatamente; enquanto o `OnceLock`
//! está vazio a estratégia semântica degrada e a cascata funciona só com
//! as estratégias textuais.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::busca::semantica::IndiceVetorial;
use crate::busca::vetorizador::ProvedorEmbeddings;
use crate::catalogo::Catalogo;
use crate::pipeline::PipelineBuscaAtividade;

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    /// Orquestrador da cascata, sem estado entre requisições.
    pub pipeline: Arc<PipelineBuscaAtividade>,
    /// Catálogo compartilhado, protegido por `RwLock`.
    pub catalogo: Arc<RwLock<Catalogo>>,
    /// Índice vetorial das atividades, populado em background.
    pub indice: Arc<IndiceVetorial>,
    /// Vetorizador, preenchido via `OnceLock::set()` quando o modelo carrega.
    pub vetorizador: Arc<OnceLock<Box<dyn ProvedorEmbeddings>>>,
}
