use serde::{Deserialize, Serialize};
use tracing::debug;

use super::pattern_matcher::CompiledPattern;
use crate::models::mapping::{normalize_code, PnMappingTable};

/// Vendor whose `123456-789` numbering is recognised before any table lookup.
pub const STRUCTURAL_RULE_VENDOR: &str = "HPE";

/// Layout of the structural rule, in pattern syntax.
pub const STRUCTURAL_RULE_PATTERN: &str = "xxxxxx-xxx";

/// Vendor guessed from code shape when no mapping table is loaded at all.
pub const FALLBACK_VENDOR: &str = "Dell";

/// Codes shorter than this are never pattern-matched.
pub const MIN_PATTERN_CODE_LEN: usize = 5;

/// How a vendor was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    None,
    Rule,
    Exact,
    Pattern,
    Fallback,
}

/// Result of a part-number lookup. `vendor` is empty when `source` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorMatch {
    pub vendor: String,
    pub source: MatchSource,

    /// Rule, exact key, pattern or heuristic that produced the match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,
}

impl VendorMatch {
    pub fn none() -> Self {
        Self {
            vendor: String::new(),
            source: MatchSource::None,
            matched_rule: None,
        }
    }

    fn found(vendor: &str, source: MatchSource, rule: impl Into<String>) -> Self {
        Self {
            vendor: vendor.to_string(),
            source,
            matched_rule: Some(rule.into()),
        }
    }

    pub fn is_match(&self) -> bool {
        self.source != MatchSource::None
    }
}

/// Maps part numbers to vendor names.
///
/// Order of precedence: structural rule, exact entry, best-ranked pattern,
/// and only when the table is completely empty, shape heuristics.
pub struct PartNumberResolver {
    structural_rule: Option<CompiledPattern>,
}

impl PartNumberResolver {
    pub fn new() -> Self {
        Self {
            structural_rule: CompiledPattern::parse(STRUCTURAL_RULE_PATTERN),
        }
    }

    pub fn resolve(&self, raw_code: &str, table: &PnMappingTable) -> VendorMatch {
        let code = normalize_code(raw_code);
        let result = self.resolve_normalized(&code, table);
        debug!(code = %code, vendor = %result.vendor, source = ?result.source, "resolved part number");
        result
    }

    fn resolve_normalized(&self, code: &str, table: &PnMappingTable) -> VendorMatch {
        if code.is_empty() {
            return VendorMatch::none();
        }

        if self.structural_rule.as_ref().is_some_and(|rule| rule.matches(code)) {
            return VendorMatch::found(
                STRUCTURAL_RULE_VENDOR,
                MatchSource::Rule,
                STRUCTURAL_RULE_PATTERN,
            );
        }

        if let Some(vendor) = table.exact.get(code) {
            return VendorMatch::found(vendor, MatchSource::Exact, code);
        }

        if code.chars().count() < MIN_PATTERN_CODE_LEN {
            return VendorMatch::none();
        }

        if let Some((pattern, vendor)) = self.best_pattern_match(code, table) {
            return VendorMatch::found(vendor, MatchSource::Pattern, pattern.source());
        }

        // Curated data supersedes the heuristics.
        if !table.is_empty() {
            return VendorMatch::none();
        }

        Self::fallback(code)
    }

    /// Highest-ranked matching rule; ties keep table order.
    pub fn best_pattern_match<'t>(
        &self,
        code: &str,
        table: &'t PnMappingTable,
    ) -> Option<(CompiledPattern, &'t str)> {
        table
            .patterns
            .iter()
            .filter(|rule| !rule.vendor.trim().is_empty())
            .filter_map(|rule| {
                let compiled = CompiledPattern::parse(&rule.pattern)?;
                compiled
                    .matches(code)
                    .then_some((compiled, rule.vendor.as_str()))
            })
            .min_by(|(a, _), (b, _)| a.rank_cmp(b))
    }

    fn fallback(code: &str) -> VendorMatch {
        let len = code.chars().count();
        if len == 5 {
            return VendorMatch::found(FALLBACK_VENDOR, MatchSource::Fallback, "5-digit");
        }
        if len == 6 && code.starts_with('0') {
            return VendorMatch::found(
                FALLBACK_VENDOR,
                MatchSource::Fallback,
                "leading-zero 6-digit",
            );
        }
        VendorMatch::none()
    }
}

impl Default for PartNumberResolver {
    fn default() -> Self {
        Self::new()
    }
}
