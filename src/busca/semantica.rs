//! # Estratégia 3 — Busca Semântica
//!
//! Compara o embedding da descrição com um índice vetorial em memória das
//! atividades do catálogo, por similaridade cosseno, devolvendo os top-K
//! vizinhos da área.
//!
//! ## Modo de Falha
//!
//! Se o provedor de embeddings estiver indisponível (modelo ainda
//! carregando, rede fora), a estratégia devolve **lista vazia** com um
//! `tracing::warn` e a cascata degrada para a seleção manual. Indisponi-
//! bilidade do provedor nunca é erro fatal da resolução.
//!
//! ## Índice
//!
//! O [`IndiceVetorial`] guarda `{código, área, vetor}` por atividade. É
//! populado em background na inicialização (depois que o modelo carrega) e
//! incrementalmente quando a extensão do catálogo cria entradas novas.
//! Leituras concorrentes são livres; a escrita é rara e curta.

use parking_lot::RwLock;

use crate::catalogo::Catalogo;

use super::vetorizador::ProvedorEmbeddings;
use super::{Estrategia, MatchCandidato};

/// Prefixo de consulta do modelo de embeddings (convenção search_query).
const PREFIXO_CONSULTA: &str = "search_query: ";

/// Prefixo de indexação do modelo de embeddings (convenção search_document).
pub const PREFIXO_DOCUMENTO: &str = "search_document: ";

/// Um item indexado: atividade do catálogo com seu vetor.
struct ItemIndice {
    codigo: String,
    area: String,
    vetor: Vec<f32>,
}

/// Índice vetorial em memória das atividades do catálogo.
#[derive(Default)]
pub struct IndiceVetorial {
    itens: RwLock<Vec<ItemIndice>>,
}

impl IndiceVetorial {
    /// Cria um índice vazio.
    pub fn novo() -> Self {
        Self::default()
    }

    /// Indexa (ou reindexa) o vetor de uma atividade.
    ///
    /// Um código já presente é substituído, para que a reindexação do
    /// catálogo inteiro seja idempotente.
    pub fn indexar(&self, codigo: &str, area: &str, vetor: Vec<f32>) {
        let mut itens = self.itens.write();
        itens.retain(|item| item.codigo != codigo);
        itens.push(ItemIndice {
            codigo: codigo.to_string(),
            area: area.trim().to_uppercase(),
            vetor,
        });
    }

    /// Número de atividades indexadas.
    pub fn total(&self) -> usize {
        self.itens.read().len()
    }

    /// Vizinhos mais próximos do vetor, restritos à área, por cosseno.
    ///
    /// Devolve até `k` pares `(código, score)` em ordem decrescente.
    pub fn vizinhos(&self, vetor: &[f32], area: &str, k: usize) -> Vec<(String, f32)> {
        let area = area.trim().to_uppercase();
        let itens = self.itens.read();
        let mut scores: Vec<(String, f32)> = itens
            .iter()
            .filter(|item| item.area == area)
            .map(|item| (item.codigo.clone(), cosseno(vetor, &item.vetor)))
            .collect();
        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scores.truncate(k);
        scores
    }
}

/// Consulta semântica: embedda a descrição e busca vizinhos na área.
///
/// Provedor ausente ou com erro degrada para lista vazia (a cascata
/// continua); o score de cada candidato é a similaridade cosseno.
pub fn busca_semantica(
    descricao: &str,
    area: &str,
    vetorizador: Option<&dyn ProvedorEmbeddings>,
    indice: &IndiceVetorial,
    catalogo: &Catalogo,
    k: usize,
) -> Vec<MatchCandidato> {
    let Some(vetorizador) = vetorizador else {
        tracing::warn!("busca semântica indisponível: vetorizador ainda não carregado");
        return Vec::new();
    };

    let consulta = format!("{PREFIXO_CONSULTA}{descricao}");
    let vetor = match vetorizador.vetorizar(&consulta) {
        Ok(v) => v,
        Err(erro) => {
            tracing::warn!(erro = %erro, "busca semântica degradada: falha ao vetorizar consulta");
            return Vec::new();
        }
    };

    indice
        .vizinhos(&vetor, area, k)
        .into_iter()
        .filter_map(|(codigo, score)| {
            catalogo.por_codigo(&codigo).map(|entrada| MatchCandidato {
                entrada: entrada.clone(),
                score,
                estrategia: Estrategia::Semantica,
            })
        })
        .collect()
}

/// Similaridade cosseno entre dois vetores.
///
/// Vetores vazios, de tamanhos diferentes ou com norma zero devolvem 0.0.
pub fn cosseno(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut produto = 0.0f32;
    let mut norma_a = 0.0f32;
    let mut norma_b = 0.0f32;
    for i in 0..a.len() {
        produto += a[i] * b[i];
        norma_a += a[i] * a[i];
        norma_b += b[i] * b[i];
    }

    let denominador = norma_a.sqrt() * norma_b.sqrt();
    if denominador == 0.0 {
        0.0
    } else {
        produto / denominador
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::catalogo::EntradaCatalogo;

    use super::*;

    // ─── cosseno ───────────────────────────────────────────────

    #[test]
    fn cosseno_identico() {
        assert!((cosseno(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosseno_ortogonal() {
        assert_eq!(cosseno(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn cosseno_casos_degenerados() {
        assert_eq!(cosseno(&[], &[]), 0.0);
        assert_eq!(cosseno(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosseno(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    // ─── índice ────────────────────────────────────────────────

    fn catalogo_teste() -> Catalogo {
        let mut catalogo = Catalogo::novo();
        catalogo
            .inserir(EntradaCatalogo::oficial("CGBEN", "M", "P", "S", "Analisar aposentadoria", "CGBEN.01.01.001"))
            .unwrap();
        catalogo
            .inserir(EntradaCatalogo::oficial("CGBEN", "M", "P", "S", "Conceder benefício", "CGBEN.01.01.002"))
            .unwrap();
        catalogo
            .inserir(EntradaCatalogo::oficial("CGTIC", "M", "P", "S", "Gerir contratos", "CGTIC.01.01.001"))
            .unwrap();
        catalogo
    }

    fn indice_teste() -> IndiceVetorial {
        let indice = IndiceVetorial::novo();
        indice.indexar("CGBEN.01.01.001", "CGBEN", vec![1.0, 0.0, 0.0]);
        indice.indexar("CGBEN.01.01.002", "CGBEN", vec![0.0, 1.0, 0.0]);
        indice.indexar("CGTIC.01.01.001", "CGTIC", vec![0.0, 0.0, 1.0]);
        indice
    }

    #[test]
    fn vizinhos_escopados_por_area() {
        let indice = indice_teste();
        let vizinhos = indice.vizinhos(&[0.0, 0.0, 1.0], "CGBEN", 5);
        assert_eq!(vizinhos.len(), 2);
        assert!(vizinhos.iter().all(|(codigo, _)| codigo.starts_with("CGBEN")));
    }

    #[test]
    fn vizinhos_ordenados_e_limitados() {
        let indice = indice_teste();
        let vizinhos = indice.vizinhos(&[0.9, 0.1, 0.0], "CGBEN", 1);
        assert_eq!(vizinhos.len(), 1);
        assert_eq!(vizinhos[0].0, "CGBEN.01.01.001");
    }

    #[test]
    fn reindexar_substitui_vetor() {
        let indice = indice_teste();
        indice.indexar("CGBEN.01.01.001", "CGBEN", vec![0.0, 1.0, 0.0]);
        assert_eq!(indice.total(), 3);
    }

    // ─── busca semântica ───────────────────────────────────────

    /// Provedor determinístico: devolve sempre o mesmo vetor.
    struct VetorFixo(Vec<f32>);

    impl ProvedorEmbeddings for VetorFixo {
        fn vetorizar(&self, _texto: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    /// Provedor que sempre falha (simula rede/modelo fora do ar).
    struct VetorFalho;

    impl ProvedorEmbeddings for VetorFalho {
        fn vetorizar(&self, _texto: &str) -> Result<Vec<f32>> {
            anyhow::bail!("provedor fora do ar")
        }
    }

    #[test]
    fn consulta_mapeia_codigos_para_entradas() {
        let catalogo = catalogo_teste();
        let indice = indice_teste();
        let provedor = VetorFixo(vec![1.0, 0.0, 0.0]);
        let candidatos = busca_semantica("analiso aposentadorias", "CGBEN", Some(&provedor), &indice, &catalogo, 5);
        assert_eq!(candidatos[0].entrada.codigo, "CGBEN.01.01.001");
        assert!(candidatos[0].score > 0.99);
        assert_eq!(candidatos[0].estrategia, Estrategia::Semantica);
    }

    #[test]
    fn provedor_ausente_degrada_para_vazio() {
        let catalogo = catalogo_teste();
        let indice = indice_teste();
        assert!(busca_semantica("qualquer", "CGBEN", None, &indice, &catalogo, 5).is_empty());
    }

    #[test]
    fn provedor_com_erro_degrada_para_vazio() {
        let catalogo = catalogo_teste();
        let indice = indice_teste();
        assert!(busca_semantica("qualquer", "CGBEN", Some(&VetorFalho), &indice, &catalogo, 5).is_empty());
    }
}
