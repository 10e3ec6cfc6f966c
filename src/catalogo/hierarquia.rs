//! # Hierarquia — Navegação Manual do Catálogo
//!
//! Quando nenhuma estratégia automática resolve a descrição do usuário,
//! a cascata devolve a hierarquia completa da área para que o chamador
//! monte um drill-down manual (estratégia 4 da cascata):
//!
//! ```text
//! Macroprocesso
//!   └── Processo
//!         └── Subprocesso
//!               └── [EntradaCatalogo, ...]
//! ```
//!
//! A estrutura é **somente leitura** e preserva a ordem de inserção do
//! catálogo em todos os níveis. Os acessores de drill-down nunca falham:
//! chave desconhecida devolve lista vazia, para que a UI degrade sem
//! tratamento especial.

use serde::{Deserialize, Serialize};

use super::entrada::EntradaCatalogo;

/// Nó de subprocesso: carrega as atividades-folha.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NoSubprocesso {
    /// Nome do subprocesso.
    pub nome: String,
    /// Atividades canônicas do subprocesso, em ordem de catálogo.
    pub atividades: Vec<EntradaCatalogo>,
}

/// Nó de processo.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NoProcesso {
    /// Nome do processo.
    pub nome: String,
    /// Subprocessos, em ordem de catálogo.
    pub subprocessos: Vec<NoSubprocesso>,
}

/// Nó de macroprocesso (raiz visível da navegação).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NoMacroprocesso {
    /// Nome do macroprocesso.
    pub nome: String,
    /// Processos, em ordem de catálogo.
    pub processos: Vec<NoProcesso>,
}

/// Hierarquia navegável construída a partir das entradas do catálogo.
///
/// Construída sob demanda por [`Catalogo`](super::loja::Catalogo) e
/// possuída pelo chamador durante uma sessão de resolução; o catálogo não
/// muta a estrutura depois de entregue.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Hierarquia {
    /// Macroprocessos em ordem de primeira aparição no catálogo.
    pub macroprocessos: Vec<NoMacroprocesso>,
}

impl Hierarquia {
    /// Monta a hierarquia a partir de uma lista ordenada de entradas.
    ///
    /// Cada nível é criado na ordem de primeira aparição, preservando a
    /// ordem estável do catálogo. Folhas nunca ficam vazias: todo
    /// subprocesso presente carrega ao menos a entrada que o originou.
    pub fn construir<'a, I>(entradas: I) -> Self
    where
        I: IntoIterator<Item = &'a EntradaCatalogo>,
    {
        let mut hierarquia = Hierarquia::default();
        for entrada in entradas {
            let im = match hierarquia
                .macroprocessos
                .iter()
                .position(|m| m.nome == entrada.macroprocesso)
            {
                Some(i) => i,
                None => {
                    hierarquia.macroprocessos.push(NoMacroprocesso {
                        nome: entrada.macroprocesso.clone(),
                        processos: Vec::new(),
                    });
                    hierarquia.macroprocessos.len() - 1
                }
            };
            let macroprocesso = &mut hierarquia.macroprocessos[im];

            let ip = match macroprocesso
                .processos
                .iter()
                .position(|p| p.nome == entrada.processo)
            {
                Some(i) => i,
                None => {
                    macroprocesso.processos.push(NoProcesso {
                        nome: entrada.processo.clone(),
                        subprocessos: Vec::new(),
                    });
                    macroprocesso.processos.len() - 1
                }
            };
            let processo = &mut macroprocesso.processos[ip];

            let is = match processo
                .subprocessos
                .iter()
                .position(|s| s.nome == entrada.subprocesso)
            {
                Some(i) => i,
                None => {
                    processo.subprocessos.push(NoSubprocesso {
                        nome: entrada.subprocesso.clone(),
                        atividades: Vec::new(),
                    });
                    processo.subprocessos.len() - 1
                }
            };

            processo.subprocessos[is].atividades.push(entrada.clone());
        }
        hierarquia
    }

    /// `true` se a hierarquia não tem nenhum macroprocesso.
    pub fn vazia(&self) -> bool {
        self.macroprocessos.is_empty()
    }

    /// Lista os nomes de processos de um macroprocesso.
    ///
    /// Macroprocesso desconhecido devolve lista vazia.
    pub fn listar_processos(&self, macroprocesso: &str) -> Vec<String> {
        self.macroprocessos
            .iter()
            .find(|m| m.nome == macroprocesso)
            .map(|m| m.processos.iter().map(|p| p.nome.clone()).collect())
            .unwrap_or_default()
    }

    /// Lista os nomes de subprocessos de um (macroprocesso, processo).
    ///
    /// Qualquer nível desconhecido devolve lista vazia.
    pub fn listar_subprocessos(&self, macroprocesso: &str, processo: &str) -> Vec<String> {
        self.macroprocessos
            .iter()
            .find(|m| m.nome == macroprocesso)
            .and_then(|m| m.processos.iter().find(|p| p.nome == processo))
            .map(|p| p.subprocessos.iter().map(|s| s.nome.clone()).collect())
            .unwrap_or_default()
    }

    /// Lista as atividades canônicas de um caminho completo.
    ///
    /// Qualquer nível desconhecido devolve lista vazia.
    pub fn listar_atividades(
        &self,
        macroprocesso: &str,
        processo: &str,
        subprocesso: &str,
    ) -> Vec<EntradaCatalogo> {
        self.macroprocessos
            .iter()
            .find(|m| m.nome == macroprocesso)
            .and_then(|m| m.processos.iter().find(|p| p.nome == processo))
            .and_then(|p| p.subprocessos.iter().find(|s| s.nome == subprocesso))
            .map(|s| s.atividades.clone())
            .unwrap_or_default()
    }

    /// Posição 1-based de um macroprocesso na hierarquia.
    ///
    /// Usada na composição de códigos CAP. Desconhecido devolve `None`.
    pub fn posicao_macroprocesso(&self, macroprocesso: &str) -> Option<usize> {
        self.macroprocessos
            .iter()
            .position(|m| m.nome == macroprocesso)
            .map(|i| i + 1)
    }

    /// Posição 1-based de um processo dentro do seu macroprocesso.
    pub fn posicao_processo(&self, macroprocesso: &str, processo: &str) -> Option<usize> {
        self.macroprocessos
            .iter()
            .find(|m| m.nome == macroprocesso)
            .and_then(|m| m.processos.iter().position(|p| p.nome == processo))
            .map(|i| i + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entradas_teste() -> Vec<EntradaCatalogo> {
        vec![
            EntradaCatalogo::oficial("A", "Macro 1", "Proc 1", "Sub 1", "Atividade a", "A.01.01.001"),
            EntradaCatalogo::oficial("A", "Macro 1", "Proc 1", "Sub 1", "Atividade b", "A.01.01.002"),
            EntradaCatalogo::oficial("A", "Macro 1", "Proc 2", "Sub 2", "Atividade c", "A.01.02.003"),
            EntradaCatalogo::oficial("A", "Macro 2", "Proc 3", "Sub 3", "Atividade d", "A.02.01.004"),
        ]
    }

    #[test]
    fn constroi_niveis_em_ordem_de_insercao() {
        let entradas = entradas_teste();
        let h = Hierarquia::construir(&entradas);
        assert_eq!(h.macroprocessos.len(), 2);
        assert_eq!(h.macroprocessos[0].nome, "Macro 1");
        assert_eq!(h.listar_processos("Macro 1"), vec!["Proc 1", "Proc 2"]);
        assert_eq!(h.listar_subprocessos("Macro 1", "Proc 1"), vec!["Sub 1"]);
    }

    #[test]
    fn folhas_nunca_vazias() {
        let entradas = entradas_teste();
        let h = Hierarquia::construir(&entradas);
        for m in &h.macroprocessos {
            for p in &m.processos {
                for s in &p.subprocessos {
                    assert!(!s.atividades.is_empty());
                }
            }
        }
    }

    #[test]
    fn chave_desconhecida_devolve_vazio() {
        let entradas = entradas_teste();
        let h = Hierarquia::construir(&entradas);
        assert!(h.listar_processos("Inexistente").is_empty());
        assert!(h.listar_subprocessos("Macro 1", "Inexistente").is_empty());
        assert!(h.listar_atividades("Macro 1", "Proc 1", "Inexistente").is_empty());
    }

    #[test]
    fn posicoes_para_composicao_de_codigo() {
        let entradas = entradas_teste();
        let h = Hierarquia::construir(&entradas);
        assert_eq!(h.posicao_macroprocesso("Macro 2"), Some(2));
        assert_eq!(h.posicao_processo("Macro 1", "Proc 2"), Some(2));
        assert_eq!(h.posicao_processo("Macro 1", "Proc 9"), None);
    }

    #[test]
    fn hierarquia_vazia() {
        let h = Hierarquia::construir(std::iter::empty());
        assert!(h.vazia());
        assert!(h.listar_processos("qualquer").is_empty());
    }
}
