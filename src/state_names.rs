//! Brazilian state name mapping for display
//! Maps UF codes to full federative unit names

use std::collections::HashMap;
use std::sync::LazyLock;

pub static STATE_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // Southeast
    m.insert("SP", "São Paulo");
    m.insert("RJ", "Rio de Janeiro");
    m.insert("MG", "Minas Gerais");
    m.insert("ES", "Espírito Santo");

    // South
    m.insert("PR", "Paraná");
    m.insert("SC", "Santa Catarina");
    m.insert("RS", "Rio Grande do Sul");

    // Central-West
    m.insert("DF", "Distrito Federal");
    m.insert("GO", "Goiás");
    m.insert("MT", "Mato Grosso");
    m.insert("MS", "Mato Grosso do Sul");

    // Northeast
    m.insert("BA", "Bahia");
    m.insert("PE", "Pernambuco");
    m.insert("CE", "Ceará");
    m.insert("MA", "Maranhão");
    m.insert("PB", "Paraíba");
    m.insert("RN", "Rio Grande do Norte");
    m.insert("AL", "Alagoas");
    m.insert("SE", "Sergipe");
    m.insert("PI", "Piauí");

    // North
    m.insert("PA", "Pará");
    m.insert("AM", "Amazonas");
    m.insert("TO", "Tocantins");
    m.insert("RO", "Rondônia");
    m.insert("AC", "Acre");
    m.insert("AP", "Amapá");
    m.insert("RR", "Roraima");

    m
});

/// Full state name, or the code itself for anything unknown
pub fn get_state_name(code: &str) -> &str {
    STATE_NAMES.get(code).copied().unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_state() {
        assert_eq!(get_state_name("SP"), "São Paulo");
        assert_eq!(get_state_name("RS"), "Rio Grande do Sul");
    }

    #[test]
    fn test_unknown_state_falls_back_to_code() {
        assert_eq!(get_state_name("XX"), "XX");
    }

    #[test]
    fn test_covers_all_27_units() {
        assert_eq!(STATE_NAMES.len(), 27);
    }
}
