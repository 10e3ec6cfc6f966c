//! # Módulo Geração — Síntese de Rótulos para a Extensão do Catálogo
//!
//! A fase B da extensão do catálogo transforma a descrição livre do
//! usuário em um rótulo canônico de atividade, coerente com a âncora
//! hierárquica escolhida. A síntese passa pela trait [`ProvedorGerativo`]:
//!
//! | Implementação | Quando é usada |
//! |---------------|----------------|
//! | [`ClienteAnthropic`](cliente_llm::ClienteAnthropic) | `ANTHROPIC_API_KEY` configurada |
//! | [`GeradorLocal`](heuristico::GeradorLocal) | sem chave de API (fallback offline) |
//!
//! Falha ou timeout do provedor NÃO derruba a resolução: a fase B devolve
//! `success=false` com o motivo no envelope e o chamador decide entre
//! retry e abortar.

pub mod cliente_llm;
pub mod heuristico;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::catalogo::Ancora;

/// Provedor de síntese de rótulos de atividade.
#[async_trait]
pub trait ProvedorGerativo: Send + Sync {
    /// Sintetiza um rótulo canônico a partir da descrição e da âncora.
    ///
    /// O rótulo deve ser curto, em infinitivo, no vocabulário de processos
    /// do setor público (ex: "Analisar processos de aposentadoria").
    async fn gerar_rotulo(&self, descricao: &str, ancora: &Ancora) -> Result<String>;

    /// Nome do provedor, para logging.
    fn nome(&self) -> &'static str;
}

/// Escolhe o provedor gerativo a partir do ambiente.
///
/// Com `ANTHROPIC_API_KEY` presente usa o cliente HTTP; sem a chave, cai
/// para o gerador local com um aviso no log.
pub fn provedor_padrao() -> Arc<dyn ProvedorGerativo> {
    match cliente_llm::ClienteAnthropic::de_ambiente() {
        Ok(cliente) => {
            tracing::info!(modelo = cliente.modelo(), "provedor gerativo: Anthropic");
            Arc::new(cliente)
        }
        Err(_) => {
            tracing::warn!("ANTHROPIC_API_KEY ausente, usando gerador local de rótulos");
            Arc::new(heuristico::GeradorLocal::novo())
        }
    }
}

/// Limpa a resposta bruta de um provedor até virar um rótulo de catálogo.
///
/// Fica com a primeira linha não vazia, remove aspas e pontuação final,
/// colapsa espaços internos.
pub fn limpar_rotulo(bruto: &str) -> String {
    let linha = bruto
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    let sem_aspas = linha.trim_matches(|c| c == '"' || c == '\'' || c == '`');
    let sem_ponto = sem_aspas.trim_end_matches(['.', ';', ':']);
    sem_ponto.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limpar_rotulo_pega_primeira_linha() {
        assert_eq!(
            limpar_rotulo("\nAnalisar demandas de TI.\nJustificativa: ..."),
            "Analisar demandas de TI"
        );
    }

    #[test]
    fn limpar_rotulo_remove_aspas_e_espacos() {
        assert_eq!(limpar_rotulo("  \"Conduzir  pregão eletrônico\"  "), "Conduzir pregão eletrônico");
    }

    #[test]
    fn limpar_rotulo_entrada_vazia() {
        assert_eq!(limpar_rotulo("   \n \n"), "");
    }
}
