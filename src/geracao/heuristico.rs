//! # Gerador Local de Rótulos — Fallback Offline
//!
//! Sem chave de API, a extensão do catálogo ainda precisa funcionar: o
//! [`GeradorLocal`] deriva um rótulo plausível da própria descrição, por
//! regras simples de reescrita. O resultado é menos polido que o do
//! provedor LLM, mas determinístico e suficiente para homologação local.
//!
//! ## Regras de Reescrita
//!
//! 1. primeira pessoa comum vira infinitivo ("analiso" → "analisar")
//! 2. prefixos conversacionais são descartados ("eu faço a análise de")
//! 3. a primeira letra é capitalizada e a pontuação final removida
//! 4. o rótulo é truncado em limite de palavras de catálogo

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::catalogo::Ancora;

use super::{limpar_rotulo, ProvedorGerativo};

/// Limite de palavras de um rótulo de catálogo.
const MAX_PALAVRAS: usize = 10;

/// Prefixos conversacionais descartados antes da reescrita.
const PREFIXOS: &[&str] = &[
    "eu ",
    "atualmente ",
    "sou responsavel por ",
    "sou responsável por ",
    "trabalho com ",
    "faço ",
    "faco ",
];

/// Gerador de rótulos por regras, sem dependência externa.
pub struct GeradorLocal;

impl GeradorLocal {
    /// Cria o gerador.
    pub fn novo() -> Self {
        Self
    }

    /// Converte um verbo em primeira pessoa do singular para infinitivo.
    ///
    /// Regra da 1ª conjugação ("analiso" → "analisar"); verbos já no
    /// infinitivo e substantivos em -ão passam intactos. Conjugações
    /// irregulares ficam imperfeitas, o que é aceitável para o fallback.
    fn infinitivo(palavra: &str) -> String {
        let minuscula = palavra.to_lowercase();
        if minuscula.ends_with("ar") || minuscula.ends_with("er") || minuscula.ends_with("ir") {
            return minuscula;
        }
        if minuscula.ends_with("ão") {
            return minuscula;
        }
        if let Some(radical) = minuscula.strip_suffix('o') {
            return format!("{radical}ar");
        }
        minuscula
    }

    /// Capitaliza a primeira letra, preservando o restante.
    fn capitalizar(texto: &str) -> String {
        let mut chars = texto.chars();
        match chars.next() {
            Some(primeira) => primeira.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

impl Default for GeradorLocal {
    fn default() -> Self {
        Self::novo()
    }
}

#[async_trait]
impl ProvedorGerativo for GeradorLocal {
    async fn gerar_rotulo(&self, descricao: &str, _ancora: &Ancora) -> Result<String> {
        let mut texto = limpar_rotulo(descricao).to_lowercase();
        for prefixo in PREFIXOS {
            if let Some(resto) = texto.strip_prefix(prefixo) {
                texto = resto.to_string();
            }
        }

        let mut palavras: Vec<String> = texto.split_whitespace().map(str::to_string).collect();
        if palavras.is_empty() {
            return Err(anyhow!("descrição vazia após limpeza"));
        }

        palavras[0] = Self::infinitivo(&palavras[0]);
        palavras.truncate(MAX_PALAVRAS);

        Ok(Self::capitalizar(&palavras.join(" ")))
    }

    fn nome(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ancora() -> Ancora {
        Ancora {
            macroprocesso: "Gestão de Benefícios".into(),
            processo: "Análise de Benefícios".into(),
            subprocesso: "Aposentadorias".into(),
        }
    }

    #[tokio::test]
    async fn primeira_pessoa_vira_infinitivo() {
        let gerador = GeradorLocal::novo();
        let rotulo = gerador.gerar_rotulo("analiso aposentadorias especiais", &ancora()).await.unwrap();
        assert_eq!(rotulo, "Analisar aposentadorias especiais");
    }

    #[tokio::test]
    async fn descarta_prefixo_conversacional() {
        let gerador = GeradorLocal::novo();
        let rotulo = gerador
            .gerar_rotulo("eu trabalho com conciliação de folha de pagamento", &ancora())
            .await
            .unwrap();
        assert_eq!(rotulo, "Conciliação de folha de pagamento");
    }

    #[tokio::test]
    async fn infinitivo_passa_intacto() {
        let gerador = GeradorLocal::novo();
        let rotulo = gerador.gerar_rotulo("Revisar pensões por morte.", &ancora()).await.unwrap();
        assert_eq!(rotulo, "Revisar pensões por morte");
    }

    #[tokio::test]
    async fn descricao_vazia_e_erro() {
        let gerador = GeradorLocal::novo();
        assert!(gerador.gerar_rotulo("   ", &ancora()).await.is_err());
    }

    #[tokio::test]
    async fn trunca_em_limite_de_palavras() {
        let gerador = GeradorLocal::novo();
        let longa = "analiso processos de concessao de beneficios em regime especial com apoio de pareceres juridicos externos";
        let rotulo = gerador.gerar_rotulo(longa, &ancora()).await.unwrap();
        assert!(rotulo.split_whitespace().count() <= MAX_PALAVRAS);
    }
}
