#![allow(dead_code)]
//! # MapaGov — Cascata de Resolução de Atividades
//!
//! **Ponto de entrada** do serviço de resolução de atividades: dado o
//! texto livre de um servidor descrevendo o que faz e a área
//! organizacional dele, resolve para uma atividade canônica do catálogo
//! (macroprocesso → processo → subprocesso → atividade, com código CAP
//! estável), ou conduz a criação assistida de uma entrada nova.
//!
//! A inicialização segue duas fases:
//!
//! 1. **Fase imediata**: o servidor web (axum) sobe e aceita conexões em
//!    `http://localhost:3000` instantaneamente; a cascata funciona com as
//!    estratégias textuais (exata e aproximada)
//! 2. **Fase background**: o BERTimbau (~400 MB) carrega em uma thread
//!    separada via `tokio::task::spawn_blocking`, o catálogo é indexado no
//!    índice vetorial e a estratégia semântica entra no ar
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging
//!   ├── Carrega catálogo do disco (ou semente)
//!   ├── Monta pipeline, AppState e Router
//!   ├── Inicia servidor TCP (porta 3000)
//!   └── Spawn background:
//!       ├── Carrega BERTimbau via HuggingFace Hub
//!       ├── Embedda as atividades do catálogo em lote
//!       ├── Popula o índice vetorial
//!       └── Publica o vetorizador no OnceLock
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Executar com logs padrão (info)
//! cargo run
//!
//! # Resolver uma descrição
//! curl -s localhost:3000/api/resolver -H 'content-type: application/json' \
//!   -d '{"description": "Conceder benefício estatutário geral", "area": "CGBEN"}'
//! ```

/// Módulo `busca` — estratégias de matching (exata, aproximada, semântica).
mod busca;

/// Módulo `catalogo` — entradas canônicas, loja, hierarquia e semente.
mod catalogo;

/// Módulo `erro` — erros tipados da resolução.
mod erro;

/// Módulo `geracao` — síntese de rótulos para a extensão do catálogo.
mod geracao;

/// Módulo `normalizador` — normalização de texto para matching.
mod normalizador;

/// Módulo `persistencia` — catálogo em JSON no disco.
mod persistencia;

/// Módulo `pipeline` — o orquestrador da cascata.
mod pipeline;

/// Módulo `web` — servidor axum e handlers JSON.
mod web;

use std::sync::{Arc, OnceLock};

use anyhow::Result;
use parking_lot::RwLock;
use tracing_subscriber::EnvFilter;

use crate::busca::semantica::{IndiceVetorial, PREFIXO_DOCUMENTO};
use crate::busca::vetorizador::{ProvedorEmbeddings, VetorizadorBert};
use crate::busca::Limiares;
use crate::pipeline::PipelineBuscaAtividade;
use crate::web::state::AppState;

/// Função principal do serviço de resolução.
///
/// # Erros
///
/// Retorna erro se não conseguir fazer bind na porta 3000 ou se o
/// servidor axum falhar durante a execução.
#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controla o nível de log. Exemplo: RUST_LOG=debug cargo run
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("MapaGov — Cascata de Resolução de Atividades");

    // Catálogo do disco, ou semente se não houver arquivo.
    let catalogo = match persistencia::carregar_catalogo() {
        Ok(carregado) => {
            tracing::info!(entradas = carregado.total(), "catálogo carregado");
            Arc::new(RwLock::new(carregado))
        }
        Err(erro) => {
            tracing::warn!(erro = %erro, "falha ao carregar catálogo do disco, partindo da semente");
            Arc::new(RwLock::new(catalogo::semente::catalogo_semente()))
        }
    };

    // Índice vetorial vazio; populado em background quando o modelo carregar.
    let indice = Arc::new(IndiceVetorial::novo());

    // OnceLock do vetorizador: enquanto vazio, a estratégia semântica degrada.
    let vetorizador: Arc<OnceLock<Box<dyn ProvedorEmbeddings>>> = Arc::new(OnceLock::new());

    // Provedor gerativo: Anthropic com chave no ambiente, local sem ela.
    let gerador = geracao::provedor_padrao();

    let pipeline = Arc::new(PipelineBuscaAtividade::novo(
        catalogo.clone(),
        indice.clone(),
        vetorizador.clone(),
        gerador,
        Limiares::default(),
    ));

    let state = AppState {
        pipeline,
        catalogo: catalogo.clone(),
        indice: indice.clone(),
        vetorizador: vetorizador.clone(),
    };

    let app = web::criar_router(state);

    // O servidor fica acessível IMEDIATAMENTE, antes do modelo carregar.
    let endereco = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(endereco).await?;
    tracing::info!("servidor no ar em http://localhost:3000");

    // Carregamento do modelo + indexação do catálogo em thread separada:
    // operação CPU-intensiva que bloquearia o runtime se rodasse inline.
    tokio::task::spawn_blocking(move || {
        tracing::info!("carregando BERTimbau (primeira execução baixa ~400MB)...");
        let bert = match VetorizadorBert::carregar() {
            Ok(bert) => bert,
            Err(erro) => {
                tracing::error!(erro = %erro, "falha ao carregar vetorizador; semântica ficará indisponível");
                return;
            }
        };

        // Indexa todas as atividades do catálogo em uma forward pass.
        let itens: Vec<(String, String, String)> = {
            let catalogo = catalogo.read();
            catalogo
                .todas()
                .iter()
                .map(|entrada| {
                    (
                        entrada.codigo.clone(),
                        entrada.area.clone(),
                        format!("{PREFIXO_DOCUMENTO}{}", entrada.atividade),
                    )
                })
                .collect()
        };
        let textos: Vec<String> = itens.iter().map(|(_, _, texto)| texto.clone()).collect();
        match bert.vetorizar_lote(&textos) {
            Ok(vetores) => {
                for ((codigo, area, _), vetor) in itens.iter().zip(vetores) {
                    indice.indexar(codigo, area, vetor);
                }
                tracing::info!(indexadas = indice.total(), "catálogo indexado no índice vetorial");
            }
            Err(erro) => {
                tracing::error!(erro = %erro, "falha ao indexar catálogo; semântica operará vazia");
            }
        }

        // Publica o vetorizador: a estratégia semântica entra no ar.
        if vetorizador.set(Box::new(bert)).is_err() {
            tracing::error!("vetorizador já publicado");
        }
        tracing::info!("sistema pronto");
    });

    axum::serve(listener, app).await?;

    Ok(())
}
