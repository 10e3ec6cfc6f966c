//! # Normalizador de Texto
//!
//! Toda estratégia de matching da cascata compara texto **normalizado**:
//! minúsculas, sem diacríticos, espaços internos colapsados. Isso garante
//! que "Conceder Benefício" e "conceder   beneficio" sejam a mesma string
//! para o matcher exato e pontuem igual no matcher aproximado.
//!
//! ## Pipeline de Normalização
//!
//! ```text
//! "  Conceder   Benefício " → lowercase → NFD → drop marcas combinantes
//!                            → colapsar espaços → trim
//!                            → "conceder beneficio"
//! ```
//!
//! A função é pura e total: nunca falha, entrada vazia produz saída vazia.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normaliza um texto para comparação entre estratégias de matching.
///
/// Aplica, nesta ordem:
/// 1. lowercase (Unicode-aware)
/// 2. decomposição NFD, descartando marcas combinantes (remove acentos)
/// 3. colapso de whitespace interno em um único espaço
/// 4. trim nas pontas
pub fn normalizar(texto: &str) -> String {
    let sem_acentos: String = texto
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    sem_acentos.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minusculas() {
        assert_eq!(normalizar("CONCEDER"), "conceder");
    }

    #[test]
    fn remove_diacriticos() {
        assert_eq!(normalizar("benefício estatutário"), "beneficio estatutario");
        assert_eq!(normalizar("pensão órfã"), "pensao orfa");
    }

    #[test]
    fn colapsa_espacos() {
        assert_eq!(normalizar("  conceder   beneficio \t geral "), "conceder beneficio geral");
    }

    #[test]
    fn entrada_vazia() {
        assert_eq!(normalizar(""), "");
        assert_eq!(normalizar("   "), "");
    }

    #[test]
    fn idempotente() {
        let uma = normalizar("Análise de Aposentadorias");
        assert_eq!(normalizar(&uma), uma);
    }

    #[test]
    fn cedilha_vira_c() {
        assert_eq!(normalizar("licitação"), "licitacao");
    }
}
