//! # Persistência — Catálogo em Disco
//!
//! Serializa/desserializa o [`Catalogo`] como JSON em `data/catalogo.json`.
//!
//! O JSON é "pretty-printed" para inspeção manual. Os índices em memória
//! são `#[serde(skip)]` e reconstruídos após o load via
//! [`Catalogo::reconstruir_indices()`]; os contadores de sequência SÃO
//! serializados, para que códigos nunca sejam reemitidos entre execuções.
//!
//! Sem arquivo em disco, o sistema parte do catálogo semente.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;

use crate::catalogo::{semente::catalogo_semente, Catalogo};

/// Caminho do arquivo de persistência (relativo à raiz do projeto).
const CAMINHO_CATALOGO: &str = "data/catalogo.json";

/// Salva o catálogo em disco como JSON pretty-printed.
///
/// Cria o diretório `data/` se não existir.
///
/// # Erros
///
/// Retorna erro se não conseguir criar o diretório, serializar ou
/// escrever o arquivo.
pub fn salvar_catalogo(catalogo: &Arc<RwLock<Catalogo>>) -> Result<()> {
    let caminho = Path::new(CAMINHO_CATALOGO);
    if let Some(diretorio) = caminho.parent() {
        std::fs::create_dir_all(diretorio).context("falha ao criar diretório data/")?;
    }
    let catalogo_leitura = catalogo.read();
    let json = serde_json::to_string_pretty(&*catalogo_leitura)
        .context("falha ao serializar o catálogo")?;
    std::fs::write(caminho, json).context("falha ao escrever data/catalogo.json")?;
    Ok(())
}

/// Carrega o catálogo do disco, ou o catálogo semente se não existir.
///
/// Após desserializar, reconstrói os índices em memória (não
/// serializados).
///
/// # Erros
///
/// Retorna erro se o arquivo existir mas estiver corrompido ou
/// incompatível com a struct atual.
pub fn carregar_catalogo() -> Result<Catalogo> {
    let caminho = Path::new(CAMINHO_CATALOGO);
    if !caminho.exists() {
        tracing::info!(
            "nenhum {} encontrado, partindo do catálogo semente",
            CAMINHO_CATALOGO
        );
        return Ok(catalogo_semente());
    }
    let json =
        std::fs::read_to_string(caminho).context("falha ao ler data/catalogo.json")?;
    let mut catalogo: Catalogo =
        serde_json::from_str(&json).context("falha ao desserializar data/catalogo.json")?;
    catalogo.reconstruir_indices();
    Ok(catalogo)
}
