//! # Módulo Web — A API da Cascata de Resolução
//!
//! Camada fina de JSON sobre o pipeline, construída com **Axum**.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Chamador (assistente de documentação, wizard, API externa)   │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Axum Router (este módulo)                                    │
//! │  ├── GET  /status                      → prontidão semântica │
//! │  ├── POST /api/resolver                → cascata completa    │
//! │  ├── GET  /api/hierarquia              → hierarquia (área?)  │
//! │  ├── GET  /api/hierarquia/processos    → drill-down nível 2  │
//! │  ├── GET  /api/hierarquia/subprocessos → drill-down nível 3  │
//! │  ├── GET  /api/hierarquia/atividades   → folhas do caminho   │
//! │  ├── POST /api/ancora                  → extensão fase A     │
//! │  └── POST /api/finalizar               → extensão fase B     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Submódulo | Responsabilidade |
//! |-----------|------------------|
//! | [`state`] | Estado compartilhado (`AppState`) |
//! | [`handlers`] | Handlers Axum de cada rota |

pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use state::AppState;

/// Cria o router Axum com todas as rotas da aplicação.
///
/// CORS permissivo: a API é consumida por front-ends de wizard servidos
/// de outras origens dentro do órgão.
pub fn criar_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(handlers::status))
        .route("/api/resolver", post(handlers::resolver))
        .route("/api/hierarquia", get(handlers::hierarquia))
        .route("/api/hierarquia/processos", get(handlers::processos))
        .route("/api/hierarquia/subprocessos", get(handlers::subprocessos))
        .route("/api/hierarquia/atividades", get(handlers::atividades))
        .route("/api/ancora", post(handlers::ancora))
        .route("/api/finalizar", post(handlers::finalizar))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
