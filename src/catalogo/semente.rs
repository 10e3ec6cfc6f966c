//! Catálogo semente compilado no binário.
//!
//! Usado quando `data/catalogo.json` não existe: cobre três áreas típicas
//! de um órgão público (benefícios, TIC e logística) para que a cascata
//! funcione de ponta a ponta já na primeira execução. Os mesmos dados
//! servem de corpus para os testes de cenário do pipeline.

use super::entrada::EntradaCatalogo;
use super::loja::Catalogo;

/// (área, macroprocesso, processo, subprocesso, atividade, código)
const ENTRADAS_SEMENTE: &[(&str, &str, &str, &str, &str, &str)] = &[
    // ─── CGBEN — Coordenação-Geral de Benefícios ──────────────
    (
        "CGBEN",
        "Gestão de Benefícios",
        "Concessão de Benefícios",
        "Benefícios Estatutários",
        "Conceder benefício estatutário geral",
        "CGBEN.01.01.001",
    ),
    (
        "CGBEN",
        "Gestão de Benefícios",
        "Concessão de Benefícios",
        "Benefícios Estatutários",
        "Conceder auxílio-natalidade",
        "CGBEN.01.01.002",
    ),
    (
        "CGBEN",
        "Gestão de Benefícios",
        "Análise de Benefícios",
        "Aposentadorias",
        "Analisar processos de aposentadoria",
        "CGBEN.01.02.003",
    ),
    (
        "CGBEN",
        "Gestão de Benefícios",
        "Análise de Benefícios",
        "Aposentadorias",
        "Revisar pensão por morte",
        "CGBEN.01.02.004",
    ),
    (
        "CGBEN",
        "Gestão de Benefícios",
        "Atendimento ao Servidor",
        "Orientação Previdenciária",
        "Orientar servidores sobre benefícios",
        "CGBEN.01.03.005",
    ),
    // ─── CGTIC — Coordenação-Geral de Tecnologia ──────────────
    (
        "CGTIC",
        "Governança de TIC",
        "Gestão de Contratos de TIC",
        "Aquisições de TIC",
        "Gerir contratos de tecnologia da informação",
        "CGTIC.01.01.001",
    ),
    (
        "CGTIC",
        "Governança de TIC",
        "Gestão de Contratos de TIC",
        "Aquisições de TIC",
        "Fiscalizar execução contratual de TIC",
        "CGTIC.01.01.002",
    ),
    (
        "CGTIC",
        "Governança de TIC",
        "Infraestrutura",
        "Redes e Comunicação",
        "Administrar infraestrutura de redes",
        "CGTIC.01.02.003",
    ),
    (
        "CGTIC",
        "Governança de TIC",
        "Infraestrutura",
        "Sistemas Corporativos",
        "Manter catálogo de sistemas corporativos",
        "CGTIC.01.02.004",
    ),
    // ─── CGLOG — Coordenação-Geral de Logística ───────────────
    (
        "CGLOG",
        "Gestão de Logística",
        "Compras e Licitações",
        "Pregões",
        "Conduzir pregão eletrônico",
        "CGLOG.01.01.001",
    ),
    (
        "CGLOG",
        "Gestão de Logística",
        "Compras e Licitações",
        "Pregões",
        "Elaborar termo de referência",
        "CGLOG.01.01.002",
    ),
    (
        "CGLOG",
        "Gestão de Logística",
        "Gestão Patrimonial",
        "Bens Móveis",
        "Realizar inventário patrimonial",
        "CGLOG.01.02.003",
    ),
];

/// Monta o catálogo semente.
///
/// As entradas semente são consistentes por construção; uma falha de
/// inserção aqui seria duplicata na tabela constante e é reportada no log
/// em vez de derrubar a inicialização.
pub fn catalogo_semente() -> Catalogo {
    let mut catalogo = Catalogo::novo();
    for (area, macroprocesso, processo, subprocesso, atividade, codigo) in ENTRADAS_SEMENTE {
        let entrada =
            EntradaCatalogo::oficial(area, macroprocesso, processo, subprocesso, atividade, codigo);
        if let Err(erro) = catalogo.inserir(entrada) {
            tracing::error!(codigo = %codigo, erro = %erro, "entrada semente rejeitada");
        }
    }
    catalogo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semente_carrega_todas_as_entradas() {
        let catalogo = catalogo_semente();
        assert_eq!(catalogo.total(), ENTRADAS_SEMENTE.len());
    }

    #[test]
    fn semente_cobre_tres_areas() {
        let catalogo = catalogo_semente();
        for area in ["CGBEN", "CGTIC", "CGLOG"] {
            assert!(!catalogo.entradas_da_area(area).is_empty(), "área {area} vazia");
        }
    }
}
