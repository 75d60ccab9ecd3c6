//! BBVA México debit account statement layout
//!
//! Expected extracted-text section:
//!   Periodo DEL 01/09/2024 AL 30/09/2024
//!   ...
//!   Detalle de Movimientos Realizados
//!   FECHA       DESCRIPCIÓN                     CARGOS  ABONOS  OPERACIÓN  LIQUIDACIÓN
//!   OPER LIQ
//!   05/SEP 05/SEP OXXO CENTRO                    45.00           787.22     787.22
//!   06/SEP 06/SEP SPEI RECIBIDO BANORTE                 1,200.00 1,987.22   1,987.22
//!   Referencia 0109250dhl
//!   ...
//!   Total de Movimientos

use regex::Regex;
use tally_core::Direction;

use crate::classifier::{compile_all, LineClassifier, Rule};
use crate::dates::{MonthTable, SPANISH_MONTHS};
use crate::error::Result;
use crate::layout::StatementLayout;
use crate::types::LineKind;

const START_MARKER: &str = "detalle de movimientos realizados";
const END_MARKERS: &[&str] = &["total de movimientos", "total movimientos", "total importe"];

const HEADER_PATTERNS: &[&str] = &[
    r"^periodo\s+del",
    r"^fecha de corte",
    r"^no\.?\s*de cuenta",
    r"^no\.?\s*de cliente",
    r"^número de cuenta",
    r"^r\.?f\.?c\.?",
    r"^clabe",
    r"^sucursal",
    r"^direccion",
    r"^telefono",
    r"^saldo",
    r"^depositos",
    r"^depósitos\s*/\s*abonos",
    r"^retiros",
    r"^otros\s+cargos",
    r"^abonos\s*\(",
    r"^cargos\s*\(",
    r"^total",
    r"^página",
    r"^pagina",
    r"^concepto",
    r"^cantidad",
    r"^columna",
    r"^\d{10,}",
];

const FOOTER_PATTERNS: &[&str] = &[
    r"^régimen fiscal",
    r"^uso de cfdi",
    r"^exportación",
    r"^no\.?\s*de serie",
    r"^fecha y hora",
    r"^estimado cliente",
    r"^disposición oficial",
    r"^certificado",
    r"^vencimiento",
    r"^tiene\s+\d+",
    r"^aclaración",
    r"^llamando al",
    r"^electrónico",
    r"^www\.",
    r"^persona que",
    r"^nota\s*:",
    r"^la\s+gat",
    r"^bbva\s+mexico",
    r"^institucion\s+de\s+banca",
    r"^grupo\s+financiero",
];

const ARTIFACT_PATTERNS: &[&str] = &[r"^\(cid:", r"^[a-z0-9+/=]{50,}", r"^[a-z0-9+/=]{30,}\|"];

const BRANCH_ADDRESS_PATTERNS: &[&str] = &[
    r"^av\.?\s+paseo",
    r"^ciudad de",
    r"^código postal",
    r"granada.*código\s+postal",
    r"col\.\s+juárez",
    r"alcaldía",
    r"paseo\s+de\s+la\s+reforma",
];

const ADDRESS_PATTERNS: &[&str] = &[r"cp\s*\d+|col\.|colonia|calle|avenida|av\."];

const SUMMARY_PATTERN: &str = r"total|porcentaje|señala|columna|rendimiento|gat";

/// Tokens that mark a real transaction even when a summary word shows up.
const MERCHANT_TOKENS: &[&str] = &["rest", "uber", "spei", "starbucks"];

const EXCLUDED_DESCRIPTION_PATTERNS: &[&str] = &[
    r"^\d+$",
    r"^no\.?\s*de",
    r"^r\.?f\.?c\.?",
    r"^clabe",
    r"^página",
    r"^pagina",
    r"^av\.?\s+paseo",
    r"^ciudad de",
    r"^código postal",
    r"^\(cid:",
    r"^[a-z0-9+/=]{30,}$",
    r"^[a-z0-9+/=]{20,}\|",
    r"depósitos\s*/\s*abonos",
    r"otros\s+cargos",
    r"total\s+importe",
    r"total\s+movimientos",
    r"nota\s*:",
    r"la\s+gat\s+real",
    r"bbva\s+mexico",
    r"institucion\s+de\s+banca",
    r"grupo\s+financiero",
    r"señala\s+con",
    r"columna.*porcentaje",
    r"granada.*código\s+postal",
    r"col\.\s+juárez",
    r"alcaldía",
    r"estimado\s+cliente",
    r"disposición\s+oficial",
];

const INCOME_MARKERS: &[&str] = &["recibido"];
const EXPENSE_MARKERS: &[&str] = &["enviado"];

pub struct BbvaMx {
    period_re: Regex,
    classifier: LineClassifier,
    excluded: Vec<Regex>,
}

impl BbvaMx {
    pub const NAME: &'static str = "bbva-mx";

    pub fn new() -> Result<Self> {
        Ok(Self {
            period_re: Regex::new(r"(?i)\bDEL\s+(\d{2})/(\d{2})/(\d{4})")?,
            classifier: build_classifier()?,
            excluded: compile_all(EXCLUDED_DESCRIPTION_PATTERNS)?,
        })
    }
}

fn build_classifier() -> Result<LineClassifier> {
    let noise = vec![
        Rule::lower_patterns("header", LineKind::Header, HEADER_PATTERNS)?,
        Rule::lower_patterns("footer", LineKind::Footer, FOOTER_PATTERNS)?,
        Rule::lower_patterns("artifact", LineKind::Artifact, ARTIFACT_PATTERNS)?,
        Rule::lower_patterns("branch-address", LineKind::Address, BRANCH_ADDRESS_PATTERNS)?,
        Rule::new("too-short", LineKind::TooShort, |l| l.char_len() < 5),
        Rule::lower_patterns("address", LineKind::Address, ADDRESS_PATTERNS)?,
        Rule::lower_pattern_unless("summary", LineKind::Summary, SUMMARY_PATTERN, MERCHANT_TOKENS)?,
    ];

    let short_code = Regex::new(r"^\d+[a-z]+$")?;
    let reference = vec![
        Rule::new("reference-label", LineKind::Reference, |l| {
            l.lower.starts_with("referencia")
        }),
        Rule::raw_pattern("code-label", LineKind::Reference, r"(?i)^(rfc|aut|referencia):")?,
        Rule::raw_pattern("long-code", LineKind::Reference, r"^[A-Z0-9]{15,}$")?,
        Rule::new("short-code", LineKind::Reference, move |l| {
            l.char_len() < 20 && short_code.is_match(&l.lower)
        }),
        Rule::raw_pattern("name-only", LineKind::Reference, r"^[A-ZÁÉÍÓÚÑ\s]{10,}$")?,
    ];

    Ok(LineClassifier::new(noise, reference))
}

impl StatementLayout for BbvaMx {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn start_marker(&self) -> &str {
        START_MARKER
    }

    fn end_markers(&self) -> &[&'static str] {
        END_MARKERS
    }

    fn months(&self) -> MonthTable {
        SPANISH_MONTHS
    }

    fn statement_year(&self, text: &str) -> Option<i32> {
        let caps = self.period_re.captures(text)?;
        caps[3].parse().ok()
    }

    fn classifier(&self) -> &LineClassifier {
        &self.classifier
    }

    fn is_excluded_description(&self, description: &str) -> bool {
        let lower = description.to_lowercase();
        self.excluded.iter().any(|re| re.is_match(&lower))
    }

    fn direction(&self, description: &str) -> Direction {
        let lower = description.to_lowercase();
        if INCOME_MARKERS.iter().any(|m| lower.contains(m)) {
            Direction::Income
        } else if EXPENSE_MARKERS.iter().any(|m| lower.contains(m)) {
            Direction::Expense
        } else {
            // Most rows in this layout are debits; no column position survives
            // text extraction to tell CARGOS from ABONOS.
            Direction::Expense
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> BbvaMx {
        BbvaMx::new().unwrap()
    }

    #[test]
    fn test_statement_year_from_period_header() {
        let l = layout();
        assert_eq!(l.statement_year("Periodo DEL 01/09/2024 AL 30/09/2024"), Some(2024));
        assert_eq!(l.statement_year("periodo del 01/12/2023 al 31/12/2023"), Some(2023));
        assert_eq!(l.statement_year("No period here 01/09/2024"), None);
        assert_eq!(l.statement_year("MODEL 01/09/2024"), None);
    }

    #[test]
    fn test_noise_lines() {
        let c = layout();
        let c = c.classifier();
        assert_eq!(c.classify("No. de Cuenta 0123456789"), LineKind::Header);
        assert_eq!(c.classify("R.F.C. BBA830831LJ2"), LineKind::Header);
        assert_eq!(c.classify("CLABE 012180001234567890"), LineKind::Header);
        assert_eq!(c.classify("Página 2 de 5"), LineKind::Header);
        assert_eq!(c.classify("SALDO ANTERIOR 1,234.00"), LineKind::Header);
        assert_eq!(c.classify("Estimado Cliente, le informamos"), LineKind::Footer);
        assert_eq!(c.classify("BBVA MEXICO, S.A., INSTITUCION DE BANCA"), LineKind::Footer);
        assert_eq!(c.classify("(cid:3)(cid:4)"), LineKind::Artifact);
        assert_eq!(
            c.classify("MIIGBzCCA++gAwIBAgIUMDAwMDEwMDAwMDA1MDUzNjY3NzcwDQYJ"),
            LineKind::Artifact
        );
        assert_eq!(c.classify("Av. Paseo de la Reforma 510"), LineKind::Address);
        assert_eq!(c.classify("Calle Granada 12 Int 4"), LineKind::Address);
        assert_eq!(c.classify("abc"), LineKind::TooShort);
        assert_eq!(c.classify("Rendimiento anual 3.5%"), LineKind::Summary);
    }

    #[test]
    fn test_summary_word_with_merchant_survives() {
        let l = layout();
        let c = l.classifier();
        assert_eq!(c.classify("07/SEP REST LA GATA 320.00"), LineKind::Candidate);
        assert_eq!(c.classify("07/SEP GATITOS FELICES 320.00"), LineKind::Summary);
    }

    #[test]
    fn test_reference_lines() {
        let l = layout();
        let c = l.classifier();
        assert_eq!(c.classify("Referencia 0109250dhl"), LineKind::Reference);
        assert_eq!(c.classify("AUT: 123456"), LineKind::Reference);
        assert_eq!(c.classify("MBAN01002510030092914825"), LineKind::Reference);
        assert_eq!(c.classify("0109250dhl"), LineKind::Reference);
        assert_eq!(c.classify("JUAN PEREZ LOPEZ"), LineKind::Reference);
        assert_eq!(c.classify("05/SEP OXXO CENTRO 45.00"), LineKind::Candidate);
    }

    #[test]
    fn test_excluded_descriptions() {
        let l = layout();
        assert!(l.is_excluded_description("123456"));
        assert!(l.is_excluded_description("No. de Cliente"));
        assert!(l.is_excluded_description("Total Importe Cargos"));
        assert!(!l.is_excluded_description("OXXO CENTRO"));
    }

    #[test]
    fn test_direction_markers() {
        let l = layout();
        assert_eq!(l.direction("SPEI RECIBIDO BANORTE"), Direction::Income);
        assert_eq!(l.direction("SPEI ENVIADO NU MEXICO"), Direction::Expense);
        assert_eq!(l.direction("DEPOSITO EN EFECTIVO"), Direction::Expense);
    }
}
