//! # Estratégia 2 — Busca Aproximada
//!
//! Razão de similaridade Jaro-Winkler entre a descrição normalizada e cada
//! atividade da área. Candidatos com score abaixo do limiar são
//! descartados; o resultado sai ordenado por score decrescente. Nada acima
//! do limiar devolve lista vazia (nunca `None`), e a cascata segue para a
//! estratégia semântica.

use crate::catalogo::EntradaCatalogo;
use crate::normalizador::normalizar;

use super::{Estrategia, MatchCandidato};

/// Compara a descrição com as atividades da área por Jaro-Winkler.
///
/// `entradas` já vem escopado por área, em ordem de catálogo. A ordenação
/// é estável, então empates de score preservam a ordem do catálogo.
pub fn busca_aproximada(
    descricao: &str,
    entradas: &[&EntradaCatalogo],
    limiar: f64,
) -> Vec<MatchCandidato> {
    let alvo = normalizar(descricao);
    if alvo.is_empty() {
        return Vec::new();
    }

    let mut candidatos: Vec<MatchCandidato> = entradas
        .iter()
        .filter_map(|entrada| {
            let score = strsim::jaro_winkler(&alvo, &normalizar(&entrada.atividade));
            (score >= limiar).then(|| MatchCandidato {
                entrada: (*entrada).clone(),
                score: score as f32,
                estrategia: Estrategia::Aproximada,
            })
        })
        .collect();

    candidatos.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidatos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::busca::LIMIAR_APROXIMADO;

    fn entradas() -> Vec<EntradaCatalogo> {
        vec![
            EntradaCatalogo::oficial("A", "M", "P", "S", "Conceder benefício estatutário geral", "A.01.01.001"),
            EntradaCatalogo::oficial("A", "M", "P", "S", "Conceder auxílio-natalidade", "A.01.01.002"),
            EntradaCatalogo::oficial("A", "M", "P", "S", "Realizar inventário patrimonial", "A.01.01.003"),
        ]
    }

    #[test]
    fn quase_identica_supera_o_limiar() {
        let entradas = entradas();
        let refs: Vec<&EntradaCatalogo> = entradas.iter().collect();
        let candidatos = busca_aproximada("conceder beneficio estatutario", &refs, LIMIAR_APROXIMADO);
        assert!(!candidatos.is_empty());
        assert_eq!(candidatos[0].entrada.codigo, "A.01.01.001");
        assert!(candidatos[0].score >= LIMIAR_APROXIMADO as f32);
        assert_eq!(candidatos[0].estrategia, Estrategia::Aproximada);
    }

    #[test]
    fn texto_sem_relacao_devolve_vazio() {
        let entradas = entradas();
        let refs: Vec<&EntradaCatalogo> = entradas.iter().collect();
        let candidatos = busca_aproximada(
            "desenvolver modelos de aprendizado de máquina",
            &refs,
            LIMIAR_APROXIMADO,
        );
        assert!(candidatos.is_empty());
    }

    #[test]
    fn ordenacao_decrescente_por_score() {
        let entradas = entradas();
        let refs: Vec<&EntradaCatalogo> = entradas.iter().collect();
        // limiar baixo para reter vários candidatos e inspecionar a ordem
        let candidatos = busca_aproximada("conceder beneficio", &refs, 0.5);
        assert!(candidatos.len() >= 2);
        for par in candidatos.windows(2) {
            assert!(par[0].score >= par[1].score);
        }
    }

    #[test]
    fn descricao_vazia_devolve_vazio() {
        let entradas = entradas();
        let refs: Vec<&EntradaCatalogo> = entradas.iter().collect();
        assert!(busca_aproximada("", &refs, LIMIAR_APROXIMADO).is_empty());
    }

    #[test]
    fn scores_ficam_no_intervalo_unitario() {
        let entradas = entradas();
        let refs: Vec<&EntradaCatalogo> = entradas.iter().collect();
        for candidato in busca_aproximada("conceder beneficio", &refs, 0.0) {
            assert!((0.0..=1.0).contains(&candidato.score));
        }
    }
}
