//! # Estratégia 1 — Busca Exata
//!
//! Igualdade de string normalizada contra as atividades da área. Sem
//! crédito parcial: qualquer diferença após a normalização é não-match,
//! independente do tamanho da diferença. Empate é decidido pela ordem
//! estável do catálogo (a primeira entrada vence).

use crate::catalogo::EntradaCatalogo;
use crate::normalizador::normalizar;

/// Busca a primeira entrada cuja atividade normalizada é igual à descrição
/// normalizada.
///
/// `entradas` já vem escopado por área pelo orquestrador, em ordem de
/// catálogo.
pub fn busca_exata<'a>(
    descricao: &str,
    entradas: &[&'a EntradaCatalogo],
) -> Option<&'a EntradaCatalogo> {
    let alvo = normalizar(descricao);
    if alvo.is_empty() {
        return None;
    }
    entradas
        .iter()
        .find(|entrada| normalizar(&entrada.atividade) == alvo)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entradas() -> Vec<EntradaCatalogo> {
        vec![
            EntradaCatalogo::oficial("A", "M", "P", "S", "Conceder benefício estatutário geral", "A.01.01.001"),
            EntradaCatalogo::oficial("A", "M", "P", "S", "Analisar processos de aposentadoria", "A.01.01.002"),
            EntradaCatalogo::oficial("A", "M", "P", "S2", "Conceder Benefício Estatutário Geral", "A.01.02.003"),
        ]
    }

    #[test]
    fn match_verbatim() {
        let entradas = entradas();
        let refs: Vec<&EntradaCatalogo> = entradas.iter().collect();
        let hit = busca_exata("Conceder benefício estatutário geral", &refs).unwrap();
        assert_eq!(hit.codigo, "A.01.01.001");
    }

    #[test]
    fn match_apos_normalizacao() {
        let entradas = entradas();
        let refs: Vec<&EntradaCatalogo> = entradas.iter().collect();
        let hit = busca_exata("  CONCEDER beneficio   estatutario geral ", &refs).unwrap();
        assert_eq!(hit.codigo, "A.01.01.001");
    }

    #[test]
    fn empate_vence_a_primeira_na_ordem_do_catalogo() {
        // a primeira e a terceira entrada normalizam para o mesmo texto
        let entradas = entradas();
        let refs: Vec<&EntradaCatalogo> = entradas.iter().collect();
        let hit = busca_exata("conceder beneficio estatutario geral", &refs).unwrap();
        assert_eq!(hit.codigo, "A.01.01.001");
    }

    #[test]
    fn sem_credito_parcial() {
        let entradas = entradas();
        let refs: Vec<&EntradaCatalogo> = entradas.iter().collect();
        // prefixo quase idêntico, ainda assim não-match
        assert!(busca_exata("Conceder benefício estatutário", &refs).is_none());
    }

    #[test]
    fn descricao_vazia_nao_casa() {
        let entradas = entradas();
        let refs: Vec<&EntradaCatalogo> = entradas.iter().collect();
        assert!(busca_exata("   ", &refs).is_none());
    }
}
