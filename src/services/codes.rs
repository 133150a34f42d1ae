// src/services/codes.rs
//
// Formatação dos códigos legíveis. A numeração vem do contador atômico
// (db::SequenceRepository); aqui ficam apenas as funções puras de formato.

use chrono::NaiveDate;

/// Primeiro número emitido para imóveis (piso 100 + 1).
pub const PROPERTY_CODE_START: i64 = 101;

/// `<prefix>-<N>`, N estritamente crescente a partir de 101.
pub fn format_property_code(prefix: &str, n: i64) -> String {
    format!("{}-{}", prefix, n)
}

/// Código de contingência quando o contador falha: componente de tempo +
/// componente aleatório, com o mesmo prefixo.
pub fn fallback_property_code(prefix: &str, epoch_secs: i64, random: u32) -> String {
    format!("{}-{}{:03}", prefix, epoch_secs % 100_000, random % 1000)
}

/// Escopo diário do contador de visitas: `V-YYYYMMDD`.
pub fn visit_code_scope(date: NaiveDate) -> String {
    format!("V-{}", date.format("%Y%m%d"))
}

/// `V-YYYYMMDD-NNNN`, sequência diária com zeros à esquerda.
pub fn format_visit_code(date: NaiveDate, seq: i64) -> String {
    format!("V-{}-{:04}", date.format("%Y%m%d"), seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codigo_de_imovel_comeca_em_101() {
        assert_eq!(format_property_code("PROP", PROPERTY_CODE_START), "PROP-101");
        assert_eq!(format_property_code("PROP", 102), "PROP-102");
    }

    #[test]
    fn codigo_de_visita_tem_sequencia_com_quatro_digitos() {
        let day = NaiveDate::from_ymd_opt(2025, 8, 30).unwrap();
        assert_eq!(format_visit_code(day, 1), "V-20250830-0001");
        assert_eq!(format_visit_code(day, 137), "V-20250830-0137");
    }

    #[test]
    fn escopo_do_contador_muda_por_dia() {
        let d1 = NaiveDate::from_ymd_opt(2025, 8, 30).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 8, 31).unwrap();
        assert_ne!(visit_code_scope(d1), visit_code_scope(d2));
    }

    #[test]
    fn fallback_preserva_o_prefixo() {
        let code = fallback_property_code("PROP", 1_756_512_000, 42);
        assert!(code.starts_with("PROP-"));
    }
}
