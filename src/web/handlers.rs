//! # Handlers HTTP — A API JSON da Cascata
//!
//! Cada função pública é um handler Axum mapeado em
//! [`super::criar_router()`]. Todos os endpoints falam JSON.
//!
//! ## Mapeamento de Erros
//!
//! | Situação | Status | Corpo |
//! |----------|--------|-------|
//! | Desfecho da cascata (inclusive sem match) | 200 | envelope completo |
//! | Erro de validação de entrada | 422 | `{"error": ...}` |
//! | Violação de invariante do catálogo | 500 | `{"error": ...}` |
//!
//! Falha do provedor gerativo NÃO vira status de erro: é um envelope 200
//! com `success=false` e o motivo em `error`, para o chamador decidir
//! entre retry e abortar.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::catalogo::{Ancora, Autor, EntradaCatalogo, Hierarquia};
use crate::erro::ErroResolucao;
use crate::persistencia;
use crate::pipeline::ResultadoResolucao;

use super::state::AppState;

/// Resposta do endpoint `/status`.
#[derive(serde::Serialize)]
pub struct StatusResposta {
    /// `true` quando o vetorizador carregou e a estratégia semântica opera.
    pub semantica_pronta: bool,
    /// Quantas atividades estão no índice vetorial.
    pub atividades_indexadas: usize,
    /// Total de entradas do catálogo.
    pub total_catalogo: usize,
}

/// Corpo de `POST /api/resolver`.
#[derive(Deserialize)]
pub struct RequisicaoResolver {
    /// Descrição livre da atividade.
    #[serde(rename = "description")]
    pub descricao: String,
    /// Área organizacional (ex: "CGBEN").
    pub area: String,
    /// Contexto opaco do chamador, apenas logado.
    #[serde(rename = "context", default)]
    pub contexto: Option<serde_json::Value>,
    /// Autor da requisição, para auditoria.
    #[serde(rename = "author", default)]
    pub autor: Option<Autor>,
}

/// Corpo de `POST /api/finalizar` (fase B da extensão).
#[derive(Deserialize)]
pub struct RequisicaoFinalizar {
    /// Descrição livre coletada depois da fase A.
    #[serde(rename = "description")]
    pub descricao: String,
    /// A mesma âncora devolvida pela fase A.
    #[serde(rename = "anchor")]
    pub ancora: Ancora,
    /// Área organizacional.
    pub area: String,
    /// Autor registrado na proveniência da entrada nova.
    #[serde(rename = "author")]
    pub autor: Autor,
}

/// Parâmetros de consulta dos endpoints de hierarquia.
#[derive(Deserialize, Default)]
pub struct ParametrosHierarquia {
    /// Restringe a hierarquia a uma área; ausente = catálogo inteiro.
    pub area: Option<String>,
    /// Nível 1 do drill-down.
    #[serde(rename = "macroprocess")]
    pub macroprocesso: Option<String>,
    /// Nível 2 do drill-down.
    #[serde(rename = "process")]
    pub processo: Option<String>,
    /// Nível 3 do drill-down.
    #[serde(rename = "subprocess")]
    pub subprocesso: Option<String>,
}

/// Traduz um [`ErroResolucao`] para resposta HTTP.
fn mapear_erro(erro: ErroResolucao) -> (StatusCode, Json<serde_json::Value>) {
    let status = if erro.e_violacao_invariante() {
        tracing::error!(erro = %erro, "violação de invariante do catálogo");
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, Json(serde_json::json!({ "error": erro.to_string() })))
}

/// GET `/status` — prontidão da camada semântica.
pub async fn status(State(state): State<AppState>) -> Json<StatusResposta> {
    Json(StatusResposta {
        semantica_pronta: state.vetorizador.get().is_some(),
        atividades_indexadas: state.indice.total(),
        total_catalogo: state.catalogo.read().total(),
    })
}

/// POST `/api/resolver` — a cascata completa de resolução.
pub async fn resolver(
    State(state): State<AppState>,
    Json(requisicao): Json<RequisicaoResolver>,
) -> Result<Json<ResultadoResolucao>, (StatusCode, Json<serde_json::Value>)> {
    state
        .pipeline
        .resolver(
            &requisicao.descricao,
            &requisicao.area,
            requisicao.contexto.as_ref(),
            requisicao.autor.as_ref(),
        )
        .map(Json)
        .map_err(mapear_erro)
}

/// GET `/api/hierarquia` — hierarquia completa ou de uma área.
pub async fn hierarquia(
    State(state): State<AppState>,
    Query(parametros): Query<ParametrosHierarquia>,
) -> Json<Hierarquia> {
    Json(state.pipeline.navegar_hierarquia(parametros.area.as_deref()))
}

/// GET `/api/hierarquia/processos` — processos de um macroprocesso.
pub async fn processos(
    State(state): State<AppState>,
    Query(parametros): Query<ParametrosHierarquia>,
) -> Json<Vec<String>> {
    let hierarquia = state.pipeline.navegar_hierarquia(parametros.area.as_deref());
    Json(hierarquia.listar_processos(parametros.macroprocesso.as_deref().unwrap_or_default()))
}

/// GET `/api/hierarquia/subprocessos` — subprocessos de um caminho.
pub async fn subprocessos(
    State(state): State<AppState>,
    Query(parametros): Query<ParametrosHierarquia>,
) -> Json<Vec<String>> {
    let hierarquia = state.pipeline.navegar_hierarquia(parametros.area.as_deref());
    Json(hierarquia.listar_subprocessos(
        parametros.macroprocesso.as_deref().unwrap_or_default(),
        parametros.processo.as_deref().unwrap_or_default(),
    ))
}

/// GET `/api/hierarquia/atividades` — atividades de um caminho completo.
pub async fn atividades(
    State(state): State<AppState>,
    Query(parametros): Query<ParametrosHierarquia>,
) -> Json<Vec<EntradaCatalogo>> {
    let hierarquia = state.pipeline.navegar_hierarquia(parametros.area.as_deref());
    Json(hierarquia.listar_atividades(
        parametros.macroprocesso.as_deref().unwrap_or_default(),
        parametros.processo.as_deref().unwrap_or_default(),
        parametros.subprocesso.as_deref().unwrap_or_default(),
    ))
}

/// POST `/api/ancora` — fase A da extensão do catálogo.
pub async fn ancora(
    State(state): State<AppState>,
    Json(ancora): Json<Ancora>,
) -> Result<Json<ResultadoResolucao>, (StatusCode, Json<serde_json::Value>)> {
    state
        .pipeline
        .propor_com_ancora(ancora)
        .map(Json)
        .map_err(mapear_erro)
}

/// POST `/api/finalizar` — fase B da extensão do catálogo.
///
/// Depois de criar a entrada, persiste o catálogo em disco; falha de
/// escrita não derruba a resposta (a entrada já vive em memória), só
/// registra o aviso.
pub async fn finalizar(
    State(state): State<AppState>,
    Json(requisicao): Json<RequisicaoFinalizar>,
) -> Result<Json<ResultadoResolucao>, (StatusCode, Json<serde_json::Value>)> {
    let resultado = state
        .pipeline
        .finalizar_com_descricao(
            &requisicao.descricao,
            requisicao.ancora,
            &requisicao.area,
            requisicao.autor,
        )
        .await
        .map_err(mapear_erro)?;

    if resultado.sucesso {
        if let Err(erro) = persistencia::salvar_catalogo(&state.catalogo) {
            tracing::warn!(erro = %erro, "falha ao persistir o catálogo após extensão");
        }
    }

    Ok(Json(resultado))
}
