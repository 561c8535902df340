// ═══════════════════════════════════════════════════════════════════
// Resolver Tests — pattern matcher, ranking, vendor resolution order
// ═══════════════════════════════════════════════════════════════════

use std::cmp::Ordering;

use resale_pricing_core::models::mapping::{PatternRule, PnMappingTable};
use resale_pricing_core::services::part_number_service::{
    MatchSource, PartNumberResolver, VendorMatch,
};
use resale_pricing_core::services::pattern_matcher::{CompiledPattern, PatternToken};

fn pattern(p: &str) -> CompiledPattern {
    CompiledPattern::parse(p).unwrap()
}

fn table(exact: &[(&str, &str)], patterns: &[(&str, &str)]) -> PnMappingTable {
    let mut t = PnMappingTable::new();
    for (code, vendor) in exact {
        t.insert_exact(code, vendor);
    }
    for (p, vendor) in patterns {
        t.insert_pattern(p, vendor);
    }
    t
}

fn resolve(code: &str, t: &PnMappingTable) -> VendorMatch {
    PartNumberResolver::new().resolve(code, t)
}

// ═══════════════════════════════════════════════════════════════════
// Pattern parsing
// ═══════════════════════════════════════════════════════════════════

mod parsing {
    use super::*;

    #[test]
    fn tokenizes_wildcards_and_literals() {
        let p = pattern("0x*+");
        assert_eq!(
            p.tokens(),
            &[
                PatternToken::Literal('0'),
                PatternToken::Digit,
                PatternToken::AnyOne,
                PatternToken::AnyMany,
            ]
        );
        assert_eq!(p.literal_count(), 1);
        assert_eq!(p.wildcard_count(), 3);
        assert_eq!(p.len(), 4);
    }

    #[test]
    fn normalizes_source() {
        assert_eq!(pattern(" xxxxxx - xxx ").source(), "XXXXXX-XXX");
    }

    #[test]
    fn blank_pattern_is_none() {
        assert!(CompiledPattern::parse("   ").is_none());
        assert!(CompiledPattern::parse("").is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Pattern matching
// ═══════════════════════════════════════════════════════════════════

mod matching {
    use super::*;

    #[test]
    fn digit_placeholder_accepts_only_digits() {
        let p = pattern("xxxxx");
        assert!(p.matches("12345"));
        assert!(!p.matches("AB123"));
        assert!(!p.matches("1234"));
        assert!(!p.matches("123456"));
    }

    #[test]
    fn whole_string_match() {
        let p = pattern("0xxxxx");
        assert!(p.matches("054321"));
        assert!(!p.matches("154321"));
        assert!(!p.matches("0543210"));
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        let p = pattern("r7xxx");
        assert!(p.matches(" R7 515 "));
        assert!(p.matches("r7515"));
    }

    #[test]
    fn any_one_matches_single_char() {
        let p = pattern("AB*1");
        assert!(p.matches("ABZ1"));
        assert!(p.matches("AB-1"));
        assert!(!p.matches("AB1"));
        assert!(!p.matches("ABZZ1"));
    }

    #[test]
    fn any_many_needs_at_least_one_char() {
        let p = pattern("DL+");
        assert!(p.matches("DL380"));
        assert!(p.matches("DLX"));
        assert!(!p.matches("DL"));
    }

    #[test]
    fn any_many_in_the_middle_backtracks() {
        let p = pattern("P+-XX");
        assert!(p.matches("P1-2-34"));
        assert!(p.matches("PA-12"));
        assert!(!p.matches("P-12"));
        assert!(!p.matches("PA-1B"));
    }

    #[test]
    fn regex_metacharacters_are_literals() {
        let p = pattern("A.B(1)");
        assert!(p.matches("A.B(1)"));
        assert!(!p.matches("AXB(1)"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Ranking
// ═══════════════════════════════════════════════════════════════════

mod ranking {
    use super::*;

    #[test]
    fn more_literals_rank_higher() {
        assert_eq!(pattern("12-XXX").rank_cmp(&pattern("XX-XXX")), Ordering::Less);
    }

    #[test]
    fn longer_pattern_breaks_literal_tie() {
        assert_eq!(pattern("HPXXXX").rank_cmp(&pattern("HP+")), Ordering::Less);
    }

    #[test]
    fn identical_shape_is_equal() {
        assert_eq!(pattern("ABX").rank_cmp(&pattern("AB*")), Ordering::Equal);
    }

    #[test]
    fn resolver_picks_best_ranked_pattern() {
        let t = table(&[], &[("XX-XXX", "Generic"), ("12-XXX", "Specific")]);
        let m = resolve("12-345", &t);
        assert_eq!(m.vendor, "Specific");
        assert_eq!(m.source, MatchSource::Pattern);
        assert_eq!(m.matched_rule.as_deref(), Some("12-XXX"));
    }

    #[test]
    fn ties_keep_table_order() {
        let t = table(&[], &[("ABX*X", "First"), ("AB*XX", "Second")]);
        assert_eq!(resolve("AB123", &t).vendor, "First");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Resolution order
// ═══════════════════════════════════════════════════════════════════

mod resolution {
    use super::*;

    #[test]
    fn structural_rule_wins_over_table() {
        let t = table(&[("123456-789", "Other")], &[("+", "Catchall")]);
        let m = resolve("123456-789", &t);
        assert_eq!(m.vendor, "HPE");
        assert_eq!(m.source, MatchSource::Rule);
        assert_eq!(m.matched_rule.as_deref(), Some("xxxxxx-xxx"));
    }

    #[test]
    fn structural_rule_applies_to_empty_table() {
        assert_eq!(resolve(" 123456-789 ", &PnMappingTable::new()).vendor, "HPE");
    }

    #[test]
    fn exact_beats_patterns() {
        let m = resolve("r7515", &PnMappingTable::builtin());
        assert_eq!(m.vendor, "Dell");
        assert_eq!(m.source, MatchSource::Exact);
        assert_eq!(m.matched_rule.as_deref(), Some("R7515"));

        let t = table(&[("12345", "Lenovo")], &[("xxxxx", "Dell")]);
        let m = resolve("12345", &t);
        assert_eq!(m.vendor, "Lenovo");
        assert_eq!(m.source, MatchSource::Exact);
    }

    #[test]
    fn short_codes_only_match_exactly() {
        let t = table(&[("R75", "Dell")], &[("+", "Anything")]);
        assert_eq!(resolve("r75", &t).source, MatchSource::Exact);
        assert_eq!(resolve("R76", &t), VendorMatch::none());
    }

    #[test]
    fn builtin_patterns() {
        let t = PnMappingTable::builtin();
        assert_eq!(resolve("12345", &t).source, MatchSource::Pattern);
        assert_eq!(resolve("012345", &t).vendor, "Dell");
    }

    #[test]
    fn letters_do_not_match_digit_patterns() {
        let m = resolve("AB123", &PnMappingTable::builtin());
        assert!(!m.is_match());
        assert!(m.vendor.is_empty());
    }

    #[test]
    fn empty_code_is_none() {
        assert_eq!(resolve("   ", &PnMappingTable::builtin()), VendorMatch::none());
    }

    #[test]
    fn non_empty_table_suppresses_fallback() {
        let t = table(&[("R7515", "Dell")], &[]);
        assert!(!resolve("12345", &t).is_match());
    }

    #[test]
    fn patterns_with_blank_vendor_are_ignored() {
        let mut t = PnMappingTable::new();
        t.patterns.push(PatternRule::new("XXXXX", " "));
        assert!(!resolve("12345", &t).is_match());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Empty-table fallback
// ═══════════════════════════════════════════════════════════════════

mod fallback {
    use super::*;

    #[test]
    fn five_characters() {
        let m = resolve("12345", &PnMappingTable::new());
        assert_eq!(m.vendor, "Dell");
        assert_eq!(m.source, MatchSource::Fallback);
        assert_eq!(m.matched_rule.as_deref(), Some("5-digit"));
    }

    #[test]
    fn six_characters_with_leading_zero() {
        let m = resolve("054321", &PnMappingTable::new());
        assert_eq!(m.vendor, "Dell");
        assert_eq!(m.matched_rule.as_deref(), Some("leading-zero 6-digit"));
    }

    #[test]
    fn other_shapes_are_none() {
        let t = PnMappingTable::new();
        assert!(!resolve("99", &t).is_match());
        assert!(!resolve("154321", &t).is_match());
        assert!(!resolve("1234567", &t).is_match());
    }
}
