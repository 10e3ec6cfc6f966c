//! # Pipeline — O Orquestrador da Cascata de Resolução
//!
//! O [`PipelineBuscaAtividade`] recebe a descrição livre de uma atividade
//! e uma área organizacional e resolve para uma entrada canônica do
//! catálogo, ou conduz o fluxo de criação de uma entrada nova.
//!
//! ## A Máquina de Estados
//!
//! ```text
//! START → EXATA → APROXIMADA → SEMÂNTICA → AGUARDANDO_SELECAO → AGUARDANDO_DESCRICAO → DONE
//!           │          │            │               │                     │
//!           └──────────┴────────────┴── saída antecipada no primeiro     └── fase B da
//!                   limiar superado (barato antes de pago)                   extensão
//! ```
//!
//! - **EXATA**: igualdade normalizada → `origin=match_exact`, score 1.0
//! - **APROXIMADA**: Jaro-Winkler ≥ limiar → `origin=match_fuzzy`
//! - **SEMÂNTICA**: cosseno ≥ limiar → `origin=semantic`, candidatos anexos
//! - esgotou → `origin=dropdown_required` com a hierarquia da área
//! - âncora escolhida → `origin=rag_aguardando_descricao` (fase A)
//! - descrição recebida → `origin=nova` com código recém-emitido (fase B)
//!
//! ## Ausência de Estado
//!
//! O orquestrador não guarda nada entre chamadas: âncora e respostas
//! parciais viajam com o chamador, que é dono do armazenamento de sessão.
//! Isso permite escalar horizontalmente sem sessão grudenta.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde::Serialize;

use crate::busca::semantica::{busca_semantica, IndiceVetorial, PREFIXO_DOCUMENTO};
use crate::busca::vetorizador::ProvedorEmbeddings;
use crate::busca::{aproximada::busca_aproximada, exata::busca_exata};
use crate::busca::{Estrategia, Limiares, MatchCandidato, MAX_CANDIDATOS};
use crate::catalogo::{Ancora, Autor, Catalogo, EntradaCatalogo, Hierarquia, TipoCodigo};
use crate::erro::ErroResolucao;
use crate::geracao::ProvedorGerativo;

/// Origem do resultado de uma resolução (a tag do envelope).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Origem {
    /// Estratégia 1: igualdade normalizada.
    #[serde(rename = "match_exact")]
    MatchExato,
    /// Estratégia 2: razão de similaridade textual.
    #[serde(rename = "match_fuzzy")]
    MatchAproximado,
    /// Estratégia 3: similaridade de embeddings.
    #[serde(rename = "semantic")]
    Semantica,
    /// Cascata esgotada: seleção manual necessária.
    #[serde(rename = "dropdown_required")]
    DropdownNecessario,
    /// Fase A da extensão: aguardando a descrição do usuário.
    #[serde(rename = "rag_aguardando_descricao")]
    RagAguardandoDescricao,
    /// Fase B da extensão: entrada nova criada.
    #[serde(rename = "nova")]
    Nova,
}

/// Ação que o chamador pode oferecer ao usuário.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Acao {
    /// Confirmar a atividade proposta.
    #[serde(rename = "confirm")]
    Confirmar,
    /// Abrir o drill-down manual da hierarquia.
    #[serde(rename = "select_manually")]
    SelecionarManualmente,
}

/// Envelope uniforme devolvido por toda chamada de resolução.
///
/// Serializa com os nomes do contrato JSON da API (`origin`, `score`,
/// `success`, `activity`, `candidates`, `actions`, `inherited_hierarchy`,
/// `code_type`). Score fica em 0.0 quando não se aplica.
#[derive(Clone, Debug, Serialize)]
pub struct ResultadoResolucao {
    /// Tag de origem do resultado.
    #[serde(rename = "origin")]
    pub origem: Origem,
    /// Score da estratégia vencedora (0.0 quando não se aplica).
    pub score: f32,
    /// `false` apenas para desfechos pendentes ou falha de provedor.
    #[serde(rename = "success")]
    pub sucesso: bool,
    /// A entrada resolvida ou criada, quando houver.
    #[serde(rename = "activity")]
    pub atividade: Option<EntradaCatalogo>,
    /// Top candidatos para desambiguação (limitado).
    #[serde(rename = "candidates")]
    pub candidatos: Vec<MatchCandidato>,
    /// Ações oferecidas ao usuário.
    #[serde(rename = "actions")]
    pub acoes: Vec<Acao>,
    /// Âncora herdada, apenas no sub-fluxo de criação (fase A).
    #[serde(rename = "inherited_hierarchy", skip_serializing_if = "Option::is_none")]
    pub hierarquia_herdada: Option<Ancora>,
    /// Marcador de proveniência da entrada devolvida.
    #[serde(rename = "code_type", skip_serializing_if = "Option::is_none")]
    pub tipo_codigo: Option<TipoCodigo>,
    /// Hierarquia da área, anexada quando a seleção manual é necessária.
    #[serde(rename = "hierarchy", skip_serializing_if = "Option::is_none")]
    pub hierarquia: Option<Hierarquia>,
    /// Motivo de falha retryable do provedor gerativo (fase B).
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub erro: Option<String>,
}

impl ResultadoResolucao {
    fn base(origem: Origem) -> Self {
        Self {
            origem,
            score: 0.0,
            sucesso: true,
            atividade: None,
            candidatos: Vec::new(),
            acoes: Vec::new(),
            hierarquia_herdada: None,
            tipo_codigo: None,
            hierarquia: None,
            erro: None,
        }
    }
}

/// Orquestrador da cascata de resolução de atividades.
///
/// Compartilhado entre requisições via `Arc`; todos os métodos tomam
/// `&self`. O catálogo fica atrás de `RwLock` (leituras na resolução,
/// escrita só na extensão) e o vetorizador atrás de `OnceLock`, preenchido
/// quando o modelo termina de carregar em background.
pub struct PipelineBuscaAtividade {
    catalogo: Arc<RwLock<Catalogo>>,
    indice: Arc<IndiceVetorial>,
    vetorizador: Arc<OnceLock<Box<dyn ProvedorEmbeddings>>>,
    gerador: Arc<dyn ProvedorGerativo>,
    limiares: Limiares,
}

impl PipelineBuscaAtividade {
    /// Monta o pipeline com seus colaboradores.
    pub fn novo(
        catalogo: Arc<RwLock<Catalogo>>,
        indice: Arc<IndiceVetorial>,
        vetorizador: Arc<OnceLock<Box<dyn ProvedorEmbeddings>>>,
        gerador: Arc<dyn ProvedorGerativo>,
        limiares: Limiares,
    ) -> Self {
        Self {
            catalogo,
            indice,
            vetorizador,
            gerador,
            limiares,
        }
    }

    /// Resolve uma descrição livre para uma entrada canônica.
    ///
    /// Estratégias em ordem estrita de custo (exata → aproximada →
    /// semântica), com saída antecipada no primeiro limiar superado; a
    /// comparação de strings grátis roda antes de qualquer chamada paga.
    /// Cascata esgotada devolve `dropdown_required` com a hierarquia da
    /// área para a seleção manual.
    ///
    /// # Erros
    ///
    /// Apenas validação de entrada ([`ErroResolucao::DescricaoVazia`],
    /// [`ErroResolucao::AreaVazia`]). Falha de provedor NUNCA chega aqui:
    /// é traduzida para resultado vazio na fronteira de cada estratégia.
    pub fn resolver(
        &self,
        descricao: &str,
        area: &str,
        contexto: Option<&serde_json::Value>,
        autor: Option<&Autor>,
    ) -> Result<ResultadoResolucao, ErroResolucao> {
        if descricao.trim().is_empty() {
            return Err(ErroResolucao::DescricaoVazia);
        }
        if area.trim().is_empty() {
            return Err(ErroResolucao::AreaVazia);
        }
        if let Some(contexto) = contexto {
            tracing::debug!(contexto = %contexto, "contexto da resolução recebido");
        }
        tracing::info!(
            area = %area,
            autor = autor.map(|a| a.nome.as_str()).unwrap_or("-"),
            "resolvendo descrição de atividade"
        );

        let catalogo = self.catalogo.read();
        let entradas = catalogo.entradas_da_area(area);

        // ─── Estratégia 1: exata ──────────────────────────────
        if let Some(entrada) = busca_exata(descricao, &entradas) {
            tracing::info!(codigo = %entrada.codigo, "match exato");
            let mut resultado = ResultadoResolucao::base(Origem::MatchExato);
            resultado.score = 1.0;
            resultado.atividade = Some(entrada.clone());
            resultado.tipo_codigo = Some(entrada.tipo_codigo);
            resultado.candidatos = vec![MatchCandidato {
                entrada: entrada.clone(),
                score: 1.0,
                estrategia: Estrategia::Exata,
            }];
            resultado.acoes = vec![Acao::Confirmar, Acao::SelecionarManualmente];
            return Ok(resultado);
        }

        // ─── Estratégia 2: aproximada ─────────────────────────
        let mut candidatos = busca_aproximada(descricao, &entradas, self.limiares.aproximado);
        if let Some(melhor) = candidatos.first().cloned() {
            tracing::info!(codigo = %melhor.entrada.codigo, score = melhor.score, "match aproximado");
            candidatos.truncate(MAX_CANDIDATOS);
            let mut resultado = ResultadoResolucao::base(Origem::MatchAproximado);
            resultado.score = melhor.score;
            resultado.atividade = Some(melhor.entrada.clone());
            resultado.tipo_codigo = Some(melhor.entrada.tipo_codigo);
            resultado.candidatos = candidatos;
            resultado.acoes = vec![Acao::Confirmar, Acao::SelecionarManualmente];
            return Ok(resultado);
        }

        // ─── Estratégia 3: semântica ──────────────────────────
        let vetorizador = self.vetorizador.get().map(|v| v.as_ref());
        let mut candidatos = busca_semantica(
            descricao,
            area,
            vetorizador,
            &self.indice,
            &catalogo,
            self.limiares.top_k,
        );
        if candidatos
            .first()
            .is_some_and(|melhor| melhor.score >= self.limiares.semantico)
        {
            let melhor = candidatos[0].clone();
            tracing::info!(codigo = %melhor.entrada.codigo, score = melhor.score, "match semântico");
            candidatos.truncate(MAX_CANDIDATOS);
            let mut resultado = ResultadoResolucao::base(Origem::Semantica);
            resultado.score = melhor.score;
            resultado.atividade = Some(melhor.entrada.clone());
            resultado.tipo_codigo = Some(melhor.entrada.tipo_codigo);
            resultado.candidatos = candidatos;
            resultado.acoes = vec![Acao::Confirmar, Acao::SelecionarManualmente];
            return Ok(resultado);
        }

        // ─── Cascata esgotada: seleção manual ─────────────────
        tracing::info!(area = %area, "cascata esgotada, seleção manual necessária");
        let mut resultado = ResultadoResolucao::base(Origem::DropdownNecessario);
        resultado.sucesso = false;
        resultado.acoes = vec![Acao::SelecionarManualmente];
        resultado.hierarquia = Some(catalogo.hierarquia_da_area(area));
        Ok(resultado)
    }

    /// Hierarquia navegável: da área, ou do catálogo inteiro.
    pub fn navegar_hierarquia(&self, area: Option<&str>) -> Hierarquia {
        let catalogo = self.catalogo.read();
        match area {
            Some(area) => catalogo.hierarquia_da_area(area),
            None => catalogo.hierarquia_completa(),
        }
    }

    /// Fase A da extensão: registra a âncora e pede a descrição.
    ///
    /// Modela uma pausa conversacional, não uma corrotina: o chamador
    /// retém a âncora e a devolve na fase B junto com a descrição.
    pub fn propor_com_ancora(&self, ancora: Ancora) -> Result<ResultadoResolucao, ErroResolucao> {
        ancora.validar()?;
        tracing::info!(
            macroprocesso = %ancora.macroprocesso,
            subprocesso = %ancora.subprocesso,
            "extensão fase A: aguardando descrição"
        );
        let mut resultado = ResultadoResolucao::base(Origem::RagAguardandoDescricao);
        resultado.sucesso = false;
        resultado.hierarquia_herdada = Some(ancora);
        Ok(resultado)
    }

    /// Fase B da extensão: sintetiza o rótulo e emite a entrada nova.
    ///
    /// A síntese roda ANTES de qualquer alocação: falha ou timeout do
    /// provedor gerativo devolve `success=false` com o motivo, sem deixar
    /// código meio-alocado. Alocação do código e inserção acontecem juntas
    /// sob o write lock do catálogo.
    ///
    /// # Erros
    ///
    /// - validação de entrada (descrição/área/âncora)
    /// - [`ErroResolucao::CodigoDuplicado`]: violação de invariante do
    ///   contador de sequência, fatal e não-retryable
    pub async fn finalizar_com_descricao(
        &self,
        descricao: &str,
        ancora: Ancora,
        area: &str,
        autor: Autor,
    ) -> Result<ResultadoResolucao, ErroResolucao> {
        if descricao.trim().is_empty() {
            return Err(ErroResolucao::DescricaoVazia);
        }
        if area.trim().is_empty() {
            return Err(ErroResolucao::AreaVazia);
        }
        ancora.validar()?;

        let rotulo = match self.gerador.gerar_rotulo(descricao, &ancora).await {
            Ok(rotulo) => rotulo,
            Err(erro) => {
                tracing::warn!(provedor = self.gerador.nome(), erro = %erro, "falha do provedor gerativo");
                let mut resultado = ResultadoResolucao::base(Origem::Nova);
                resultado.sucesso = false;
                resultado.hierarquia_herdada = Some(ancora);
                resultado.erro = Some(format!("falha do provedor gerativo: {erro}"));
                return Ok(resultado);
            }
        };

        let entrada = {
            let mut catalogo = self.catalogo.write();
            match catalogo.inserir_nova_atividade(&ancora, &rotulo, area, &autor) {
                Ok(entrada) => entrada,
                Err(erro @ ErroResolucao::EntradaDuplicada(_)) => {
                    // rótulo sintetizado colidiu com atividade já existente
                    // sob a mesma âncora: desfecho soft, o chamador decide
                    tracing::warn!(rotulo = %rotulo, "rótulo gerado já cadastrado na âncora");
                    let mut resultado = ResultadoResolucao::base(Origem::Nova);
                    resultado.sucesso = false;
                    resultado.hierarquia_herdada = Some(ancora);
                    resultado.erro = Some(erro.to_string());
                    return Ok(resultado);
                }
                Err(erro) => {
                    tracing::error!(erro = %erro, "violação de invariante na extensão do catálogo");
                    return Err(erro);
                }
            }
        };

        self.indexar_nova_entrada(&entrada);

        let mut resultado = ResultadoResolucao::base(Origem::Nova);
        resultado.atividade = Some(entrada);
        resultado.tipo_codigo = Some(TipoCodigo::OficialGeradoRag);
        resultado.acoes = vec![Acao::Confirmar];
        Ok(resultado)
    }

    /// Indexa a entrada recém-criada no índice vetorial, best effort.
    ///
    /// Sem vetorizador (modelo ainda carregando) ou com falha de embedding
    /// a entrada fica fora do índice até a próxima reindexação; a criação
    /// em si nunca falha por causa disso.
    fn indexar_nova_entrada(&self, entrada: &EntradaCatalogo) {
        let Some(vetorizador) = self.vetorizador.get() else {
            return;
        };
        let texto = format!("{PREFIXO_DOCUMENTO}{}", entrada.atividade);
        match vetorizador.vetorizar(&texto) {
            Ok(vetor) => self.indice.indexar(&entrada.codigo, &entrada.area, vetor),
            Err(erro) => {
                tracing::warn!(codigo = %entrada.codigo, erro = %erro, "falha ao indexar entrada nova");
            }
        }
    }
}
