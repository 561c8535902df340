// ═══════════════════════════════════════════════════════════════════
// Model Tests — currencies, mapping payloads, settings, rates, config
// ═══════════════════════════════════════════════════════════════════

use chrono::{Duration, TimeZone, Utc};
use std::str::FromStr;

use resale_pricing_core::errors::CoreError;
use resale_pricing_core::models::config::{CoreConfig, DEFAULT_HISTORY_LIMIT};
use resale_pricing_core::models::currency::CurrencyCode;
use resale_pricing_core::models::history::{CalculationHistory, CalculationRecord};
use resale_pricing_core::models::mapping::{normalize_code, PatternRule, PnMappingTable};
use resale_pricing_core::models::pricing::{EditedField, PricingInputs};
use resale_pricing_core::models::rate::{RateCache, RateSource};
use resale_pricing_core::models::settings::{AppSettings, SettingsUpdate, Theme};

// ═══════════════════════════════════════════════════════════════════
// CurrencyCode
// ═══════════════════════════════════════════════════════════════════

mod currency {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(CurrencyCode::from_str(" usd ").unwrap(), CurrencyCode::Usd);
        assert_eq!("Gbp".parse::<CurrencyCode>().unwrap(), CurrencyCode::Gbp);
    }

    #[test]
    fn unknown_code_is_unsupported() {
        let err = "JPY".parse::<CurrencyCode>().unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedCurrency(ref c) if c == "JPY"));
    }

    #[test]
    fn default_is_eur() {
        assert_eq!(CurrencyCode::default(), CurrencyCode::Eur);
    }

    #[test]
    fn default_rate_is_reciprocal_of_quote() {
        for c in CurrencyCode::ALL {
            assert!((c.default_rate() * c.default_quote() - 1.0).abs() < 1e-12);
        }
        assert_eq!(CurrencyCode::Eur.default_quote(), 4.3);
        assert_eq!(CurrencyCode::Nok.default_quote(), 0.37);
    }

    #[test]
    fn serializes_as_uppercase_code() {
        assert_eq!(serde_json::to_string(&CurrencyCode::Chf).unwrap(), "\"CHF\"");
        let c: CurrencyCode = serde_json::from_str("\"DKK\"").unwrap();
        assert_eq!(c, CurrencyCode::Dkk);
    }
}

// ═══════════════════════════════════════════════════════════════════
// PnMappingTable
// ═══════════════════════════════════════════════════════════════════

mod mapping_table {
    use super::*;

    #[test]
    fn normalize_strips_whitespace_and_uppercases() {
        assert_eq!(normalize_code("  r 75\t15 "), "R7515");
    }

    #[test]
    fn builtin_contents() {
        let t = PnMappingTable::builtin();
        assert_eq!(t.get_exact("r7515"), Some("Dell"));
        assert_eq!(
            t.patterns,
            vec![
                PatternRule::new("XXXXX", "Dell"),
                PatternRule::new("0XXXXX", "Dell"),
                PatternRule::new("XXXXXX-XXX", "HPE"),
            ]
        );
    }

    #[test]
    fn legacy_flat_object_becomes_exact_table_plus_builtin_patterns() {
        let t: PnMappingTable =
            serde_json::from_str(r#"{"r7515": "Dell", "DL380": "HPE", "bad": 5}"#).unwrap();
        assert_eq!(t.exact.len(), 2);
        assert_eq!(t.get_exact("DL380"), Some("HPE"));
        assert_eq!(t.patterns, PnMappingTable::builtin().patterns);
    }

    #[test]
    fn structured_payload() {
        let json = r#"{
            "exact": {"abc 1": "Lenovo"},
            "patterns": [
                {"pattern": "dlxxx", "vendor": "HPE"},
                {"pattern": "dlxxx", "vendor": "HPE"},
                {"pattern": "", "vendor": "X"},
                {"nonsense": true}
            ]
        }"#;
        let t: PnMappingTable = serde_json::from_str(json).unwrap();
        assert_eq!(t.get_exact("ABC1"), Some("Lenovo"));
        assert_eq!(t.patterns, vec![PatternRule::new("DLXXX", "HPE")]);
    }

    #[test]
    fn structured_payload_without_patterns_has_none() {
        let t: PnMappingTable = serde_json::from_str(r#"{"exact": {}}"#).unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn serialized_shape_reads_back() {
        let t = PnMappingTable::builtin();
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["exact"]["R7515"], "Dell");
        assert_eq!(json["patterns"][2]["vendor"], "HPE");
        let back: PnMappingTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn insert_and_remove() {
        let mut t = PnMappingTable::new();
        assert!(!t.insert_exact(" ", "Dell"));
        assert!(!t.insert_exact("R1", "  "));
        assert!(t.insert_exact("r1", " Dell "));
        assert_eq!(t.get_exact("R1"), Some("Dell"));
        assert_eq!(t.remove_exact(" r1"), Some("Dell".to_string()));

        assert!(t.insert_pattern("ab+", "X"));
        assert!(!t.insert_pattern("AB+", "X"));
        assert!(t.insert_pattern("AB+", "Y"));
        assert_eq!(t.remove_pattern("ab +"), 2);
        assert!(t.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = AppSettings::default();
        assert_eq!(s.theme, Theme::Light);
        assert_eq!(s.default_currency, CurrencyCode::Eur);
        assert_eq!(s.default_commission_rate, 0.15);
        assert_eq!(s.default_client_vat_rate, 0.23);
        assert_eq!(s.rate_source, RateSource::Frankfurter);
        assert!(s.auto_save);
        assert!(s.notifications);
    }

    #[test]
    fn partial_json_merges_over_defaults() {
        let s: AppSettings =
            serde_json::from_str(r#"{"theme": "dark", "rateSource": "erapi"}"#).unwrap();
        assert_eq!(s.theme, Theme::Dark);
        assert_eq!(s.rate_source, RateSource::OpenErApi);
        assert_eq!(s.default_commission_rate, 0.15);
        assert!(s.auto_save);
    }

    #[test]
    fn apply_partial_update() {
        let mut s = AppSettings::default();
        s.apply(SettingsUpdate {
            default_currency: Some(CurrencyCode::Sek),
            auto_save: Some(false),
            ..SettingsUpdate::default()
        })
        .unwrap();
        assert_eq!(s.default_currency, CurrencyCode::Sek);
        assert!(!s.auto_save);
        assert_eq!(s.theme, Theme::Light);
    }

    #[test]
    fn invalid_update_changes_nothing() {
        let mut s = AppSettings::default();
        let err = s
            .apply(SettingsUpdate {
                theme: Some(Theme::Dark),
                default_client_vat_rate: Some(1.5),
                ..SettingsUpdate::default()
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert_eq!(s, AppSettings::default());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Rates
// ═══════════════════════════════════════════════════════════════════

mod rates {
    use super::*;

    #[test]
    fn source_wire_names() {
        assert_eq!(serde_json::to_string(&RateSource::ExchangeRateHost).unwrap(), "\"exchangerate\"");
        assert_eq!(serde_json::to_string(&RateSource::Frankfurter).unwrap(), "\"frankfurter\"");
        assert_eq!(RateSource::OpenErApi.to_string(), "open.er-api.com");
    }

    #[test]
    fn cache_entry_expires_after_ttl() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let ttl = Duration::seconds(300);
        let mut cache = RateCache::new();
        cache.set(CurrencyCode::Usd, 0.25, t0);

        assert_eq!(
            cache.get_fresh(CurrencyCode::Usd, t0 + Duration::seconds(299), ttl).map(|c| c.rate),
            Some(0.25)
        );
        assert!(cache.get_fresh(CurrencyCode::Usd, t0 + ttl, ttl).is_none());
        assert!(cache.get_fresh(CurrencyCode::Eur, t0, ttl).is_none());

        cache.clear();
        assert!(cache.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Pricing inputs & history records
// ═══════════════════════════════════════════════════════════════════

mod records {
    use super::*;

    #[test]
    fn default_inputs_use_eur_default_rate() {
        let i = PricingInputs::default();
        assert_eq!(i.currency, CurrencyCode::Eur);
        assert!((i.exchange_rate - 1.0 / 4.3).abs() < 1e-12);
        assert!(!i.has_amount());
    }

    #[test]
    fn non_finite_amounts_are_not_known() {
        let mut i = PricingInputs::default();
        i.net_amount = Some(f64::NAN);
        assert_eq!(i.known_net(), None);
        assert!(!i.has_amount());
    }

    #[test]
    fn history_json_without_optional_fields() {
        let json = r#"{
            "calculations": [{
                "id": "2b0f3d0e-6d0b-4c53-9a59-4c8e9f0f6a11",
                "timestamp": "2024-05-01T12:00:00Z",
                "net": 100.0, "gross": 123.0, "listingPrice": 35.36,
                "currency": "EUR", "exchangeRate": 0.25,
                "commissionRate": 0.15, "clientVatRate": 0.23, "multiplier": 0.2875
            }],
            "lastUpdated": "2024-05-01T12:00:00Z"
        }"#;
        let h: CalculationHistory = serde_json::from_str(json).unwrap();
        let r = h.latest().unwrap();
        assert_eq!(r.product_id, None);
        assert_eq!(r.source, None);
        assert!(!r.preset);
        assert_eq!(h.get(r.id), Some(r));
    }

    #[test]
    fn signature_reflects_displayed_values() {
        let base = CalculationRecord {
            id: uuid::Uuid::new_v4(),
            timestamp: Utc::now(),
            net: 100.0,
            gross: 123.0,
            listing_price: 35.3625,
            currency: CurrencyCode::Eur,
            exchange_rate: 0.25,
            commission_rate: 0.15,
            client_vat_rate: 0.23,
            multiplier: 0.2875,
            product_id: None,
            source: Some(EditedField::Net),
            preset: false,
        };
        let same_display = CalculationRecord {
            id: uuid::Uuid::new_v4(),
            listing_price: 35.3601,
            ..base.clone()
        };
        let other_currency = CalculationRecord {
            currency: CurrencyCode::Usd,
            ..base.clone()
        };
        assert_eq!(base.signature(), same_display.signature());
        assert_ne!(base.signature(), other_currency.signature());

        let from_preset = CalculationRecord {
            source: Some(EditedField::ClientVat),
            preset: true,
            ..base.clone()
        };
        assert_eq!(from_preset.origin_label(), "Preset");
        assert!(from_preset.signature().starts_with("Preset|"));
        assert_eq!(base.origin_label(), "Net");
    }
}

// ═══════════════════════════════════════════════════════════════════
// CoreConfig
// ═══════════════════════════════════════════════════════════════════

mod config {
    use super::*;

    #[test]
    fn defaults() {
        let c = CoreConfig::default();
        assert_eq!(c.mapping_store_url, None);
        assert_eq!(c.rate_cache_ttl_secs, 300);
        assert_eq!(c.http_timeout_secs, 30);
        assert_eq!(c.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(c.logging.level, "info");
        assert!(!c.logging.json);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c: CoreConfig =
            serde_json::from_str(r#"{"history_limit": 10, "logging": {"json": true}}"#).unwrap();
        assert_eq!(c.history_limit, 10);
        assert!(c.logging.json);
        assert_eq!(c.logging.level, "info");
        assert_eq!(c.rate_cache_ttl_secs, 300);
    }

    // Only test in this binary touching PRICING_* variables.
    #[test]
    fn from_env_overlays_variables() {
        std::env::set_var("PRICING_MAPPING_STORE_URL", "https://pn.example.org/ ");
        std::env::set_var("PRICING_HISTORY_LIMIT", "0");
        std::env::set_var("PRICING_RATE_CACHE_TTL_SECS", "60");
        std::env::set_var("PRICING_LOG_JSON", "true");

        let c = CoreConfig::from_env();

        std::env::remove_var("PRICING_MAPPING_STORE_URL");
        std::env::remove_var("PRICING_HISTORY_LIMIT");
        std::env::remove_var("PRICING_RATE_CACHE_TTL_SECS");
        std::env::remove_var("PRICING_LOG_JSON");

        assert_eq!(c.mapping_store_url.as_deref(), Some("https://pn.example.org"));
        assert_eq!(c.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(c.rate_cache_ttl_secs, 60);
        assert!(c.logging.json);
    }
}
