//! # Catalogo — A Loja Canônica de Atividades
//!
//! O [`Catalogo`] é o contêiner central da cascata: guarda todas as
//! [`EntradaCatalogo`] em ordem estável de inserção, com índices em
//! memória para busca por área e verificação de unicidade.
//!
//! ## Armazenamento
//!
//! - **Entradas**: `Vec<EntradaCatalogo>` preservando a ordem do catálogo
//!   (a ordem é o critério de desempate do matcher exato)
//! - **Índice por área**: `HashMap<área, Vec<índice>>`
//! - **Códigos emitidos**: `HashSet<String>` para o invariante de unicidade
//! - **Contadores de sequência**: `HashMap<área, u32>`, monotônicos
//!
//! Os índices são marcados `#[serde(skip)]` e **não são serializados**.
//! Após desserializar, [`reconstruir_indices()`](Catalogo::reconstruir_indices)
//! deve ser chamado para repovoá-los (mesmo contrato da persistência do
//! resto do sistema).
//!
//! ## Concorrência
//!
//! No servidor o catálogo vive atrás de `Arc<RwLock<Catalogo>>`. A alocação
//! de código e a inserção acontecem na mesma seção crítica (`&mut self`),
//! então duas extensões concorrentes na mesma área nunca recebem o mesmo
//! código. Código duplicado na inserção é violação de invariante, nunca
//! ignorado.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::erro::ErroResolucao;

use super::entrada::{Autor, EntradaCatalogo, TipoCodigo};
use super::hierarquia::Hierarquia;

/// Âncora hierárquica escolhida pelo usuário no drill-down manual.
///
/// Caminho parcial (sem a folha) que delimita onde a extensão do catálogo
/// vai criar a nova atividade. Criada pelo navegador de hierarquia,
/// consumida pela extensão, nunca persistida além da sessão do chamador.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ancora {
    /// Nível 1 escolhido.
    #[serde(rename = "macroprocess")]
    pub macroprocesso: String,
    /// Nível 2 escolhido.
    #[serde(rename = "process")]
    pub processo: String,
    /// Nível 3 escolhido.
    #[serde(rename = "subprocess")]
    pub subprocesso: String,
}

impl Ancora {
    /// Valida que os três níveis vieram preenchidos.
    pub fn validar(&self) -> Result<(), ErroResolucao> {
        if self.macroprocesso.trim().is_empty()
            || self.processo.trim().is_empty()
            || self.subprocesso.trim().is_empty()
        {
            return Err(ErroResolucao::AncoraIncompleta);
        }
        Ok(())
    }
}

/// Loja canônica de atividades com contadores de sequência por área.
#[derive(Serialize, Deserialize)]
pub struct Catalogo {
    /// Entradas em ordem estável de inserção.
    entradas: Vec<EntradaCatalogo>,

    /// Contador de sequência por área, monotônico. Serializado junto com
    /// as entradas para que códigos nunca sejam reutilizados entre
    /// execuções, mesmo que entradas sejam removidas manualmente do JSON.
    contadores: HashMap<String, u32>,

    /// Índice por área: área (maiúscula) → índices em `entradas`.
    ///
    /// **Não serializado**, reconstruído após load.
    #[serde(skip, default)]
    indice_area: HashMap<String, Vec<usize>>,

    /// Códigos já emitidos, para o invariante de unicidade.
    #[serde(skip, default)]
    codigos: HashSet<String>,

    /// Chaves hierárquicas já cadastradas, para o invariante da tupla.
    #[serde(skip, default)]
    chaves: HashSet<String>,
}

/// Forma esperada de um código CAP: área + componentes numéricos.
const PADRAO_CODIGO: &str = r"^[A-Z][A-Z0-9]{1,11}(\.\d{2,3})+$";

impl Catalogo {
    /// Cria um catálogo vazio.
    pub fn novo() -> Self {
        Self {
            entradas: Vec::new(),
            contadores: HashMap::new(),
            indice_area: HashMap::new(),
            codigos: HashSet::new(),
            chaves: HashSet::new(),
        }
    }

    /// Reconstrói os índices em memória a partir das entradas.
    ///
    /// **Deve ser chamado após desserialização** (os índices são
    /// `#[serde(skip)]`). Também garante o piso dos contadores: cada
    /// contador de área fica no mínimo igual ao maior sufixo numérico já
    /// emitido naquela área, então um JSON editado à mão não faz o
    /// catálogo reemitir código.
    pub fn reconstruir_indices(&mut self) {
        self.indice_area.clear();
        self.codigos.clear();
        self.chaves.clear();
        for (i, entrada) in self.entradas.iter().enumerate() {
            self.indice_area
                .entry(chave_area(&entrada.area))
                .or_default()
                .push(i);
            self.codigos.insert(entrada.codigo.clone());
            self.chaves.insert(entrada.chave_hierarquica());

            if let Some(sequencia) = sufixo_numerico(&entrada.codigo) {
                let contador = self.contadores.entry(chave_area(&entrada.area)).or_insert(0);
                if *contador < sequencia {
                    *contador = sequencia;
                }
            }
        }
    }

    /// Insere uma entrada, impondo os invariantes de unicidade.
    ///
    /// # Erros
    ///
    /// - [`ErroResolucao::CodigoDuplicado`] se o código já foi emitido
    /// - [`ErroResolucao::EntradaDuplicada`] se a tupla hierárquica já existe
    pub fn inserir(&mut self, entrada: EntradaCatalogo) -> Result<(), ErroResolucao> {
        if self.codigos.contains(&entrada.codigo) {
            return Err(ErroResolucao::CodigoDuplicado(entrada.codigo));
        }
        let chave = entrada.chave_hierarquica();
        if self.chaves.contains(&chave) {
            return Err(ErroResolucao::EntradaDuplicada(chave));
        }
        if let Ok(padrao) = Regex::new(PADRAO_CODIGO) {
            if !padrao.is_match(&entrada.codigo) {
                tracing::warn!(codigo = %entrada.codigo, "código fora do formato CAP esperado");
            }
        }

        // O contador da área nunca fica abaixo do maior sufixo já emitido,
        // senão a próxima alocação colidiria com um código existente.
        if let Some(sequencia) = sufixo_numerico(&entrada.codigo) {
            let contador = self.contadores.entry(chave_area(&entrada.area)).or_insert(0);
            if *contador < sequencia {
                *contador = sequencia;
            }
        }

        tracing::debug!(codigo = %entrada.codigo, atividade = %entrada.atividade, "catálogo: entrada armazenada");
        let indice = self.entradas.len();
        self.indice_area
            .entry(chave_area(&entrada.area))
            .or_default()
            .push(indice);
        self.codigos.insert(entrada.codigo.clone());
        self.chaves.insert(chave);
        self.entradas.push(entrada);
        Ok(())
    }

    /// Todas as entradas, em ordem de catálogo.
    pub fn todas(&self) -> &[EntradaCatalogo] {
        &self.entradas
    }

    /// Entradas de uma área, em ordem de catálogo.
    ///
    /// Área desconhecida devolve vazio.
    pub fn entradas_da_area(&self, area: &str) -> Vec<&EntradaCatalogo> {
        self.indice_area
            .get(&chave_area(area))
            .map(|indices| indices.iter().map(|&i| &self.entradas[i]).collect())
            .unwrap_or_default()
    }

    /// Busca uma entrada pelo código CAP.
    pub fn por_codigo(&self, codigo: &str) -> Option<&EntradaCatalogo> {
        self.entradas.iter().find(|e| e.codigo == codigo)
    }

    /// Hierarquia navegável de uma área.
    pub fn hierarquia_da_area(&self, area: &str) -> Hierarquia {
        Hierarquia::construir(self.entradas_da_area(area).into_iter())
    }

    /// Hierarquia navegável do catálogo inteiro.
    pub fn hierarquia_completa(&self) -> Hierarquia {
        Hierarquia::construir(self.entradas.iter())
    }

    /// Próximo código CAP da área, incrementando o contador de sequência.
    ///
    /// Formato `AREA.MM.PP.NNN`: `MM`/`PP` são as posições 1-based do
    /// macroprocesso e do processo da âncora na hierarquia da área (`99`
    /// quando a âncora abre um ramo novo), `NNN` é o contador monotônico
    /// da área. O incremento acontece sob `&mut self`, então chamadores
    /// segurando o write lock do catálogo alocam atomicamente.
    fn proximo_codigo(&mut self, area: &str, ancora: &Ancora) -> String {
        let hierarquia = self.hierarquia_da_area(area);
        let posicao_macro = hierarquia
            .posicao_macroprocesso(&ancora.macroprocesso)
            .unwrap_or(99);
        let posicao_processo = hierarquia
            .posicao_processo(&ancora.macroprocesso, &ancora.processo)
            .unwrap_or(99);

        let contador = self.contadores.entry(chave_area(area)).or_insert(0);
        *contador += 1;
        format!(
            "{}.{:02}.{:02}.{:03}",
            chave_area(area),
            posicao_macro,
            posicao_processo,
            contador
        )
    }

    /// Cria e insere uma nova atividade ancorada, em uma seção crítica.
    ///
    /// Aloca o código, monta a entrada com proveniência RAG
    /// ([`TipoCodigo::OficialGeradoRag`], autor, timestamp UTC) e insere.
    /// Alocação e inserção compartilham o mesmo `&mut self`: sob o write
    /// lock do catálogo, duas chamadas concorrentes jamais produzem o
    /// mesmo código.
    ///
    /// # Erros
    ///
    /// [`ErroResolucao::CodigoDuplicado`] aqui significa contador de
    /// sequência corrompido; o erro é fatal e não deve ser retentado.
    pub fn inserir_nova_atividade(
        &mut self,
        ancora: &Ancora,
        rotulo: &str,
        area: &str,
        autor: &Autor,
    ) -> Result<EntradaCatalogo, ErroResolucao> {
        let codigo = self.proximo_codigo(area, ancora);
        let entrada = EntradaCatalogo {
            area: chave_area(area),
            macroprocesso: ancora.macroprocesso.clone(),
            processo: ancora.processo.clone(),
            subprocesso: ancora.subprocesso.clone(),
            atividade: rotulo.to_string(),
            codigo,
            tipo_codigo: TipoCodigo::OficialGeradoRag,
            criado_por: Some(autor.clone()),
            criado_em: Some(Utc::now()),
        };
        tracing::info!(
            codigo = %entrada.codigo,
            atividade = %entrada.atividade,
            autor = %autor.nome,
            "catálogo: nova atividade gerada via extensão"
        );
        self.inserir(entrada.clone())?;
        Ok(entrada)
    }

    /// Número total de entradas.
    pub fn total(&self) -> usize {
        self.entradas.len()
    }
}

/// Chave canônica de área: maiúscula, sem espaços nas pontas.
fn chave_area(area: &str) -> String {
    area.trim().to_uppercase()
}

/// Último componente numérico de um código CAP (o contador de sequência).
fn sufixo_numerico(codigo: &str) -> Option<u32> {
    codigo.rsplit('.').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::RwLock;

    use super::*;

    fn catalogo_teste() -> Catalogo {
        let mut catalogo = Catalogo::novo();
        for entrada in [
            EntradaCatalogo::oficial("CGBEN", "Gestão de Benefícios", "Concessão", "Estatutários", "Conceder benefício", "CGBEN.01.01.001"),
            EntradaCatalogo::oficial("CGBEN", "Gestão de Benefícios", "Análise", "Aposentadorias", "Analisar aposentadoria", "CGBEN.01.02.002"),
            EntradaCatalogo::oficial("CGTIC", "Governança de TIC", "Contratos", "Aquisições", "Gerir contratos de TIC", "CGTIC.01.01.001"),
        ] {
            catalogo.inserir(entrada).unwrap();
        }
        catalogo
    }

    fn ancora_teste() -> Ancora {
        Ancora {
            macroprocesso: "Gestão de Benefícios".into(),
            processo: "Análise".into(),
            subprocesso: "Aposentadorias".into(),
        }
    }

    fn autor_teste() -> Autor {
        Autor {
            nome: "Maria da Silva".into(),
            id: "12345".into(),
        }
    }

    // ─── invariantes de inserção ───────────────────────────────

    #[test]
    fn rejeita_codigo_duplicado() {
        let mut catalogo = catalogo_teste();
        let duplicada = EntradaCatalogo::oficial("CGBEN", "Outro", "Outro", "Outro", "Outra atividade", "CGBEN.01.01.001");
        assert!(matches!(
            catalogo.inserir(duplicada),
            Err(ErroResolucao::CodigoDuplicado(_))
        ));
    }

    #[test]
    fn rejeita_tupla_duplicada() {
        let mut catalogo = catalogo_teste();
        let duplicada = EntradaCatalogo::oficial("CGBEN", "Gestão de Benefícios", "Concessão", "Estatutários", "Conceder benefício", "CGBEN.09.09.999");
        assert!(matches!(
            catalogo.inserir(duplicada),
            Err(ErroResolucao::EntradaDuplicada(_))
        ));
    }

    // ─── busca por área ────────────────────────────────────────

    #[test]
    fn area_escopa_entradas() {
        let catalogo = catalogo_teste();
        assert_eq!(catalogo.entradas_da_area("CGBEN").len(), 2);
        assert_eq!(catalogo.entradas_da_area("cgben").len(), 2);
        assert!(catalogo.entradas_da_area("CGSAU").is_empty());
    }

    #[test]
    fn hierarquia_da_area_nao_vaza_outras_areas() {
        let catalogo = catalogo_teste();
        let h = catalogo.hierarquia_da_area("CGTIC");
        assert_eq!(h.macroprocessos.len(), 1);
        assert_eq!(h.macroprocessos[0].nome, "Governança de TIC");
    }

    // ─── alocação de códigos ───────────────────────────────────

    #[test]
    fn nova_atividade_recebe_codigo_com_posicoes_da_ancora() {
        let mut catalogo = catalogo_teste();
        let entrada = catalogo
            .inserir_nova_atividade(&ancora_teste(), "Revisar aposentadoria especial", "CGBEN", &autor_teste())
            .unwrap();
        // macro 1, processo "Análise" é o 2º do macro, sequência segue do piso 2
        assert_eq!(entrada.codigo, "CGBEN.01.02.003");
        assert_eq!(entrada.tipo_codigo, TipoCodigo::OficialGeradoRag);
        assert!(entrada.criado_por.is_some());
        assert!(entrada.criado_em.is_some());
    }

    #[test]
    fn ancora_em_ramo_novo_usa_posicao_99() {
        let mut catalogo = catalogo_teste();
        let ancora = Ancora {
            macroprocesso: "Macroprocesso Inédito".into(),
            processo: "Processo Inédito".into(),
            subprocesso: "Subprocesso Inédito".into(),
        };
        let entrada = catalogo
            .inserir_nova_atividade(&ancora, "Atividade inédita", "CGBEN", &autor_teste())
            .unwrap();
        assert!(entrada.codigo.starts_with("CGBEN.99.99."));
    }

    #[test]
    fn contador_sobrevive_a_reload() {
        let mut catalogo = catalogo_teste();
        let json = serde_json::to_string(&catalogo).unwrap();
        let mut recarregado: Catalogo = serde_json::from_str(&json).unwrap();
        recarregado.reconstruir_indices();

        let antes = catalogo
            .inserir_nova_atividade(&ancora_teste(), "Atividade x", "CGBEN", &autor_teste())
            .unwrap();
        let depois = recarregado
            .inserir_nova_atividade(&ancora_teste(), "Atividade x", "CGBEN", &autor_teste())
            .unwrap();
        // o contador recarregado parte do mesmo piso, nunca regride
        assert_eq!(antes.codigo, depois.codigo);
    }

    #[test]
    fn codigos_distintos_sob_concorrencia() {
        let catalogo = Arc::new(RwLock::new(catalogo_teste()));
        let mut threads = Vec::new();
        for i in 0..16 {
            let catalogo = catalogo.clone();
            threads.push(std::thread::spawn(move || {
                let rotulo = format!("Atividade concorrente {i}");
                catalogo
                    .write()
                    .inserir_nova_atividade(&ancora_teste(), &rotulo, "CGBEN", &autor_teste())
                    .unwrap()
                    .codigo
            }));
        }
        let codigos: HashSet<String> = threads.into_iter().map(|t| t.join().unwrap()).collect();
        assert_eq!(codigos.len(), 16);
    }

    // ─── índices após reload ───────────────────────────────────

    #[test]
    fn reload_reconstroi_indices() {
        let catalogo = catalogo_teste();
        let json = serde_json::to_string(&catalogo).unwrap();
        let mut recarregado: Catalogo = serde_json::from_str(&json).unwrap();
        assert!(recarregado.entradas_da_area("CGBEN").is_empty());
        recarregado.reconstruir_indices();
        assert_eq!(recarregado.entradas_da_area("CGBEN").len(), 2);
        assert!(matches!(
            recarregado.inserir(EntradaCatalogo::oficial("X", "m", "p", "s", "a", "CGBEN.01.01.001")),
            Err(ErroResolucao::CodigoDuplicado(_))
        ));
    }
}
