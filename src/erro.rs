//! # Erros Tipados da Resolução
//!
//! A cascata de resolução distingue três famílias de falha:
//!
//! | Família | Exemplo | Tratamento |
//! |---------|---------|------------|
//! | Erro de entrada | descrição vazia | rejeitado antes de qualquer estratégia (HTTP 422) |
//! | Provedor degradado | embedding fora do ar | NÃO é erro: a estratégia devolve vazio e a cascata segue |
//! | Violação de invariante | código CAP duplicado | fatal, indica corrupção do catálogo (HTTP 500) |
//!
//! Resultados "soft" (nenhum match, aguardando descrição) nunca viram erro:
//! eles são estados normais do envelope [`ResultadoResolucao`](crate::pipeline::ResultadoResolucao).

use thiserror::Error;

/// Erro tipado da cascata de resolução de atividades.
#[derive(Debug, Error)]
pub enum ErroResolucao {
    /// A descrição da atividade veio vazia ou só com espaços.
    #[error("descrição da atividade é obrigatória")]
    DescricaoVazia,

    /// A área organizacional veio vazia.
    #[error("área organizacional é obrigatória")]
    AreaVazia,

    /// A âncora hierárquica não tem os três níveis preenchidos.
    #[error("âncora hierárquica incompleta: macroprocesso, processo e subprocesso são obrigatórios")]
    AncoraIncompleta,

    /// Tentativa de emitir um código CAP que já existe no catálogo.
    ///
    /// Nunca deve acontecer sob alocação atômica do contador; se acontecer,
    /// o contador de sequência da área está corrompido e o erro não é
    /// retryable.
    #[error("código CAP duplicado: {0} (contador de sequência corrompido)")]
    CodigoDuplicado(String),

    /// A tupla (macroprocesso, processo, subprocesso, atividade) já existe.
    #[error("atividade já cadastrada no catálogo: {0}")]
    EntradaDuplicada(String),
}

impl ErroResolucao {
    /// Indica se o erro é uma violação de invariante do catálogo.
    ///
    /// Violações de invariante devem ser logadas e sinalizadas de forma
    /// distinta de erros de validação de entrada.
    pub fn e_violacao_invariante(&self) -> bool {
        matches!(
            self,
            ErroResolucao::CodigoDuplicado(_) | ErroResolucao::EntradaDuplicada(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codigo_duplicado_e_invariante() {
        assert!(ErroResolucao::CodigoDuplicado("CGBEN.01.01.001".into()).e_violacao_invariante());
    }

    #[test]
    fn validacao_nao_e_invariante() {
        assert!(!ErroResolucao::DescricaoVazia.e_violacao_invariante());
        assert!(!ErroResolucao::AreaVazia.e_violacao_invariante());
    }
}
