//! # EntradaCatalogo — Registro Canônico de Atividade
//!
//! Uma [`EntradaCatalogo`] é a unidade do catálogo de atividades: a folha
//! da hierarquia macroprocesso → processo → subprocesso, identificada por
//! um código CAP estável (ex: `CGBEN.01.02.003`).
//!
//! ## Invariantes
//!
//! - a tupla `(macroprocesso, processo, subprocesso, atividade)` é única
//! - o `codigo` é único e nunca é reutilizado depois de emitido
//!
//! Ambos os invariantes são impostos pela [`Catalogo`](super::loja::Catalogo)
//! no momento da inserção.
//!
//! ## Proveniência
//!
//! Entradas criadas pela extensão do catálogo (fluxo RAG) carregam
//! [`TipoCodigo::OficialGeradoRag`], autor e timestamp. Consumidores usam
//! esse marcador para sinalizar entradas pendentes de validação humana.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Origem do código de uma entrada do catálogo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TipoCodigo {
    /// Entrada pré-existente do catálogo oficial.
    #[serde(rename = "oficial")]
    Oficial,
    /// Entrada criada pelo fluxo de extensão assistida (RAG).
    ///
    /// Pendente de validação humana posterior.
    #[serde(rename = "oficial_gerado_rag")]
    OficialGeradoRag,
}

/// Autor de uma entrada criada via extensão do catálogo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autor {
    /// Nome legível do servidor que descreveu a atividade.
    #[serde(rename = "name")]
    pub nome: String,
    /// Identificador do servidor no sistema chamador.
    pub id: String,
}

/// Registro canônico e imutável de uma atividade do catálogo.
///
/// Os nomes de serialização seguem o contrato JSON da API
/// (`macroprocess`/`process`/`subprocess`/`activity`/`code`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntradaCatalogo {
    /// Área organizacional dona da entrada (ex: "CGBEN").
    pub area: String,
    /// Nível 1 da hierarquia.
    #[serde(rename = "macroprocess")]
    pub macroprocesso: String,
    /// Nível 2 da hierarquia.
    #[serde(rename = "process")]
    pub processo: String,
    /// Nível 3 da hierarquia.
    #[serde(rename = "subprocess")]
    pub subprocesso: String,
    /// Rótulo da atividade (a folha).
    #[serde(rename = "activity")]
    pub atividade: String,
    /// Código CAP estável e único (ex: "CGBEN.01.02.003").
    #[serde(rename = "code")]
    pub codigo: String,
    /// Origem do código (oficial pré-existente ou gerado via RAG).
    #[serde(rename = "code_type")]
    pub tipo_codigo: TipoCodigo,
    /// Autor, quando a entrada nasceu da extensão do catálogo.
    #[serde(rename = "created_by", skip_serializing_if = "Option::is_none", default)]
    pub criado_por: Option<Autor>,
    /// Timestamp de criação, quando a entrada nasceu da extensão do catálogo.
    #[serde(rename = "created_at", skip_serializing_if = "Option::is_none", default)]
    pub criado_em: Option<DateTime<Utc>>,
}

impl EntradaCatalogo {
    /// Constrói uma entrada oficial pré-existente do catálogo.
    pub fn oficial(
        area: &str,
        macroprocesso: &str,
        processo: &str,
        subprocesso: &str,
        atividade: &str,
        codigo: &str,
    ) -> Self {
        Self {
            area: area.to_string(),
            macroprocesso: macroprocesso.to_string(),
            processo: processo.to_string(),
            subprocesso: subprocesso.to_string(),
            atividade: atividade.to_string(),
            codigo: codigo.to_string(),
            tipo_codigo: TipoCodigo::Oficial,
            criado_por: None,
            criado_em: None,
        }
    }

    /// Chave de unicidade hierárquica da entrada.
    ///
    /// A tupla completa, em texto, usada pelo catálogo para detectar
    /// duplicatas na inserção.
    pub fn chave_hierarquica(&self) -> String {
        format!(
            "{}::{}::{}::{}",
            self.macroprocesso, self.processo, self.subprocesso, self.atividade
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializa_nomes_de_contrato() {
        let entrada = EntradaCatalogo::oficial(
            "CGBEN",
            "Gestão de Benefícios",
            "Concessão",
            "Benefícios Estatutários",
            "Conceder benefício estatutário geral",
            "CGBEN.01.01.001",
        );
        let json = serde_json::to_value(&entrada).unwrap();
        assert_eq!(json["macroprocess"], "Gestão de Benefícios");
        assert_eq!(json["code"], "CGBEN.01.01.001");
        assert_eq!(json["code_type"], "oficial");
        // Campos de proveniência ausentes em entradas oficiais
        assert!(json.get("created_by").is_none());
    }

    #[test]
    fn chave_hierarquica_inclui_os_quatro_niveis() {
        let entrada = EntradaCatalogo::oficial("A", "m", "p", "s", "a", "A.01.01.001");
        assert_eq!(entrada.chave_hierarquica(), "m::p::s::a");
    }
}
