//! # Cliente Anthropic — Síntese de Rótulos via Messages API
//!
//! Chama a Messages API para transformar a descrição do usuário em um
//! rótulo canônico, contextualizado pela âncora hierárquica. A chamada
//! tem timeout de requisição limitado: estourar o timeout vira um erro
//! comum do provedor, que a fase B reporta como falha retryable no
//! envelope (nunca deixa um código meio-alocado, porque a alocação só
//! acontece depois da síntese).

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::catalogo::Ancora;

use super::{limpar_rotulo, ProvedorGerativo};

/// Modelo padrão quando `ANTHROPIC_MODEL` não está definido.
const MODELO_PADRAO: &str = "claude-sonnet-4-20250514";

/// Timeout da requisição HTTP ao provedor.
const TIMEOUT_REQUISICAO: Duration = Duration::from_secs(30);

/// Prompt de sistema da síntese de rótulos.
const PROMPT_SISTEMA: &str = "Você nomeia atividades de catálogos de processos do setor público \
brasileiro. Responda com UMA linha contendo apenas o rótulo da atividade, começando com um verbo \
no infinitivo (ex: Analisar, Conceder, Elaborar), sem aspas, sem ponto final, sem explicações.";

/// Cliente da Messages API da Anthropic.
#[derive(Clone)]
pub struct ClienteAnthropic {
    api_key: String,
    cliente: reqwest::Client,
    modelo: String,
}

impl ClienteAnthropic {
    /// Cria o cliente com a chave dada; modelo vem de `ANTHROPIC_MODEL`.
    pub fn novo(api_key: String) -> Result<Self> {
        let modelo = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| MODELO_PADRAO.to_string());
        let cliente = reqwest::Client::builder()
            .timeout(TIMEOUT_REQUISICAO)
            .build()?;
        Ok(Self {
            api_key,
            cliente,
            modelo,
        })
    }

    /// Cria o cliente a partir de `ANTHROPIC_API_KEY`.
    pub fn de_ambiente() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow!("variável ANTHROPIC_API_KEY não definida"))?;
        Self::novo(api_key)
    }

    /// Nome do modelo configurado.
    pub fn modelo(&self) -> &str {
        &self.modelo
    }

    async fn chamar_api(&self, prompt_usuario: &str) -> Result<String> {
        let resposta = self
            .cliente
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "model": &self.modelo,
                "max_tokens": 128,
                "system": PROMPT_SISTEMA,
                "messages": [{"role": "user", "content": prompt_usuario}]
            }))
            .send()
            .await?;

        if !resposta.status().is_success() {
            let status = resposta.status();
            let corpo = resposta.text().await.unwrap_or_default();
            return Err(anyhow!("erro da API Anthropic {status}: {corpo}"));
        }

        #[derive(Deserialize)]
        struct BlocoConteudo {
            text: Option<String>,
        }
        #[derive(Deserialize)]
        struct RespostaApi {
            content: Vec<BlocoConteudo>,
        }

        let resposta: RespostaApi = resposta.json().await?;
        resposta
            .content
            .first()
            .and_then(|bloco| bloco.text.clone())
            .ok_or_else(|| anyhow!("resposta vazia do provedor"))
    }
}

#[async_trait]
impl ProvedorGerativo for ClienteAnthropic {
    async fn gerar_rotulo(&self, descricao: &str, ancora: &Ancora) -> Result<String> {
        let prompt = format!(
            "Macroprocesso: {}\nProcesso: {}\nSubprocesso: {}\n\nDescrição do servidor: {}\n\n\
             Rótulo da atividade:",
            ancora.macroprocesso, ancora.processo, ancora.subprocesso, descricao
        );
        let bruto = self.chamar_api(&prompt).await?;
        let rotulo = limpar_rotulo(&bruto);
        if rotulo.is_empty() {
            return Err(anyhow!("provedor devolveu rótulo vazio"));
        }
        Ok(rotulo)
    }

    fn nome(&self) -> &'static str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modelo_padrao_sem_env() {
        // não depende de ANTHROPIC_MODEL estar limpa no ambiente de CI;
        // só garante que a construção não falha e expõe algum modelo
        let cliente = ClienteAnthropic::novo("chave-teste".into()).unwrap();
        assert!(!cliente.modelo().is_empty());
        assert_eq!(cliente.nome(), "anthropic");
    }
}
