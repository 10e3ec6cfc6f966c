//! # Módulo Catálogo — Dados Canônicos e Navegação
//!
//! | Submódulo | Responsabilidade |
//! |-----------|------------------|
//! | [`entrada`] | Registro canônico ([`EntradaCatalogo`]) e proveniência |
//! | [`loja`] | Loja com índices, invariantes e contadores de sequência |
//! | [`hierarquia`] | Estrutura navegável para o drill-down manual |
//! | [`semente`] | Catálogo inicial compilado no binário |

pub mod entrada;
pub mod hierarquia;
pub mod loja;
pub mod semente;

pub use entrada::{Autor, EntradaCatalogo, TipoCodigo};
pub use hierarquia::Hierarquia;
pub use loja::{Ancora, Catalogo};
