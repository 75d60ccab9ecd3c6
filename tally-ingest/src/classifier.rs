//! Line classification: ordered `(predicate, outcome)` rules, first match wins.
//!
//! Two rule lists are kept apart. Noise rules catch page furniture
//! (headers, legal footers, addresses, summaries); reference rules catch
//! the code/name lines that sit between transaction rows.

use std::fmt;

use regex::Regex;

use crate::types::LineKind;

/// A line as the rules see it.
pub struct LineView<'a> {
    /// Trimmed, original case
    pub raw: &'a str,
    /// Trimmed, lower-cased
    pub lower: String,
}

impl<'a> LineView<'a> {
    pub fn new(line: &'a str) -> Self {
        let raw = line.trim();
        Self {
            raw,
            lower: raw.to_lowercase(),
        }
    }

    pub fn char_len(&self) -> usize {
        self.raw.chars().count()
    }
}

type Predicate = Box<dyn Fn(&LineView<'_>) -> bool + Send + Sync>;

pub struct Rule {
    pub name: &'static str,
    pub kind: LineKind,
    test: Predicate,
}

impl Rule {
    pub fn new(
        name: &'static str,
        kind: LineKind,
        test: impl Fn(&LineView<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            kind,
            test: Box::new(test),
        }
    }

    /// Rule matching any of `patterns` against the lower-cased line.
    pub fn lower_patterns(
        name: &'static str,
        kind: LineKind,
        patterns: &[&str],
    ) -> Result<Self, regex::Error> {
        let res = compile_all(patterns)?;
        Ok(Self::new(name, kind, move |l| {
            res.iter().any(|re| re.is_match(&l.lower))
        }))
    }

    /// Rule matching `pattern` against the lower-cased line unless one of the
    /// `unless` tokens also appears in it.
    pub fn lower_pattern_unless(
        name: &'static str,
        kind: LineKind,
        pattern: &str,
        unless: &'static [&'static str],
    ) -> Result<Self, regex::Error> {
        let re = Regex::new(pattern)?;
        Ok(Self::new(name, kind, move |l| {
            re.is_match(&l.lower) && !unless.iter().any(|tok| l.lower.contains(tok))
        }))
    }

    /// Rule matching `pattern` against the trimmed line in its original case.
    pub fn raw_pattern(
        name: &'static str,
        kind: LineKind,
        pattern: &str,
    ) -> Result<Self, regex::Error> {
        let re = Regex::new(pattern)?;
        Ok(Self::new(name, kind, move |l| re.is_match(l.raw)))
    }

    pub fn matches(&self, line: &LineView<'_>) -> bool {
        (self.test)(line)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct LineClassifier {
    noise: Vec<Rule>,
    reference: Vec<Rule>,
}

impl LineClassifier {
    pub fn new(noise: Vec<Rule>, reference: Vec<Rule>) -> Self {
        Self { noise, reference }
    }

    /// First noise rule matching the line, if any.
    pub fn noise_rule(&self, line: &str) -> Option<&Rule> {
        first_match(&self.noise, &LineView::new(line))
    }

    /// First reference rule matching the line, if any.
    pub fn reference_rule(&self, line: &str) -> Option<&Rule> {
        first_match(&self.reference, &LineView::new(line))
    }

    pub fn is_noise(&self, line: &str) -> bool {
        self.noise_rule(line).is_some()
    }

    pub fn is_reference(&self, line: &str) -> bool {
        self.reference_rule(line).is_some()
    }

    /// Noise rules first, then reference rules; anything left is a candidate.
    pub fn classify(&self, line: &str) -> LineKind {
        let view = LineView::new(line);
        first_match(&self.noise, &view)
            .or_else(|| first_match(&self.reference, &view))
            .map(|r| r.kind)
            .unwrap_or(LineKind::Candidate)
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.noise.iter().chain(self.reference.iter())
    }
}

fn first_match<'r>(rules: &'r [Rule], line: &LineView<'_>) -> Option<&'r Rule> {
    rules.iter().find(|r| r.matches(line))
}

pub(crate) fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| Regex::new(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> LineClassifier {
        LineClassifier::new(
            vec![
                Rule::lower_patterns("header", LineKind::Header, &[r"^saldo", r"^total"]).unwrap(),
                Rule::new("too-short", LineKind::TooShort, |l| l.char_len() < 5),
                Rule::lower_pattern_unless("summary", LineKind::Summary, r"total|porcentaje", &["uber"])
                    .unwrap(),
            ],
            vec![Rule::raw_pattern("long-code", LineKind::Reference, r"^[A-Z0-9]{15,}$").unwrap()],
        )
    }

    #[test]
    fn test_first_match_wins() {
        let c = classifier();
        // Matches both "header" and "summary"; header is listed first
        assert_eq!(c.classify("TOTAL CARGOS"), LineKind::Header);
        assert_eq!(c.noise_rule("TOTAL CARGOS").map(|r| r.name), Some("header"));
    }

    #[test]
    fn test_summary_escape_hatch() {
        let c = classifier();
        assert_eq!(c.classify("pago porcentaje anual"), LineKind::Summary);
        assert_eq!(c.classify("UBER porcentaje promo"), LineKind::Candidate);
    }

    #[test]
    fn test_reference_rules_see_original_case() {
        let c = classifier();
        assert_eq!(c.classify("MBAN01002510030092914825"), LineKind::Reference);
        assert!(c.is_reference("MBAN01002510030092914825"));
        assert!(!c.is_reference("mban01002510030092914825"));
    }

    #[test]
    fn test_predicates_are_pure() {
        let c = classifier();
        let line = "  abc ";
        assert_eq!(c.classify(line), c.classify(line));
        assert_eq!(c.classify(line), LineKind::TooShort);
    }
}
