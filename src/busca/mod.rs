//! # Módulo Busca — As Estratégias de Matching da Cascata
//!
//! A resolução tenta as estratégias em ordem de custo, saindo na primeira
//! que supera seu limiar de confiança:
//!
//! ```text
//! 1. Exata       — igualdade de string normalizada        (grátis)
//! 2. Aproximada  — razão Jaro-Winkler ≥ 0.82              (grátis)
//! 3. Semântica   — similaridade de embeddings ≥ 0.78      (forward pass)
//! ```
//!
//! Os limiares aproximado e semântico são constantes **independentes**:
//! medem escalas diferentes (razão de edição vs. cosseno de vetores) e são
//! calibrados separadamente pelo corpus de testes.
//!
//! | Submódulo | Responsabilidade |
//! |-----------|------------------|
//! | [`exata`] | Estratégia 1: igualdade normalizada |
//! | [`aproximada`] | Estratégia 2: razão de similaridade textual |
//! | [`semantica`] | Estratégia 3: índice vetorial + cosseno |
//! | [`vetorizador`] | Provedor de embeddings (BERTimbau via candle) |

pub mod aproximada;
pub mod exata;
pub mod semantica;
pub mod vetorizador;

use serde::Serialize;

use crate::catalogo::EntradaCatalogo;

/// Limiar da estratégia aproximada (razão Jaro-Winkler).
///
/// Mesmo corte usado para matching de sinônimos no restante do sistema.
pub const LIMIAR_APROXIMADO: f64 = 0.82;

/// Limiar da estratégia semântica (similaridade cosseno).
pub const LIMIAR_SEMANTICO: f32 = 0.78;

/// Quantos vizinhos o índice vetorial devolve por consulta.
pub const TOP_K_SEMANTICO: usize = 5;

/// Quantos candidatos o envelope de resposta carrega para desambiguação.
pub const MAX_CANDIDATOS: usize = 3;

/// Estratégia que produziu um candidato.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Estrategia {
    /// Igualdade de string normalizada.
    #[serde(rename = "exact")]
    Exata,
    /// Razão de similaridade textual (Jaro-Winkler).
    #[serde(rename = "fuzzy")]
    Aproximada,
    /// Similaridade de embeddings (cosseno).
    #[serde(rename = "semantic")]
    Semantica,
}

/// Candidato transiente produzido por uma estratégia de matching.
///
/// Criado dentro de uma invocação de estratégia, consumido imediatamente
/// pelo orquestrador e descartado depois que a resposta é montada.
#[derive(Clone, Debug, Serialize)]
pub struct MatchCandidato {
    /// A entrada canônica candidata.
    #[serde(rename = "activity")]
    pub entrada: EntradaCatalogo,
    /// Score em [0, 1] na escala da estratégia de origem.
    pub score: f32,
    /// Estratégia que produziu o candidato.
    #[serde(rename = "strategy")]
    pub estrategia: Estrategia,
}

/// Limiares da cascata, agrupados para injeção nos testes.
#[derive(Clone, Copy, Debug)]
pub struct Limiares {
    /// Corte da estratégia aproximada.
    pub aproximado: f64,
    /// Corte da estratégia semântica.
    pub semantico: f32,
    /// Top-K da consulta ao índice vetorial.
    pub top_k: usize,
}

impl Default for Limiares {
    fn default() -> Self {
        Self {
            aproximado: LIMIAR_APROXIMADO,
            semantico: LIMIAR_SEMANTICO,
            top_k: TOP_K_SEMANTICO,
        }
    }
}
