use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Strip every whitespace character and uppercase.
/// Both part numbers and patterns are compared in this form.
pub fn normalize_code(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// One wildcard rule: `X` = digit, `*` = any single character,
/// `+` = one or more characters, anything else is a literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    pub pattern: String,
    pub vendor: String,
}

impl PatternRule {
    pub fn new(pattern: impl Into<String>, vendor: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            vendor: vendor.into(),
        }
    }
}

/// Part-number → vendor lookup data: exact codes plus ordered wildcard rules.
///
/// Exact keys and patterns are normalized on every way in, so lookups are
/// whitespace- and case-insensitive. Deserialization also accepts the legacy
/// flat `{code: vendor}` shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMappingPayload")]
pub struct PnMappingTable {
    pub exact: BTreeMap<String, String>,
    pub patterns: Vec<PatternRule>,
}

impl PnMappingTable {
    /// An empty table. Resolution falls back to heuristics only in this state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The table shipped with the calculator, used when nothing is cached.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert_exact("R7515", "Dell");
        for rule in builtin_patterns() {
            table.insert_pattern(&rule.pattern, &rule.vendor);
        }
        table
    }

    /// True when neither exact entries nor patterns are loaded.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.patterns.len()
    }

    pub fn get_exact(&self, code: &str) -> Option<&str> {
        self.exact.get(&normalize_code(code)).map(String::as_str)
    }

    /// Insert or overwrite an exact entry. Returns false (and changes nothing)
    /// when the code or the vendor is blank.
    pub fn insert_exact(&mut self, code: &str, vendor: &str) -> bool {
        let key = normalize_code(code);
        let vendor = vendor.trim();
        if key.is_empty() || vendor.is_empty() {
            return false;
        }
        self.exact.insert(key, vendor.to_string());
        true
    }

    pub fn remove_exact(&mut self, code: &str) -> Option<String> {
        self.exact.remove(&normalize_code(code))
    }

    /// Append a pattern rule. Blank input and exact duplicates
    /// (same normalized pattern and vendor) are ignored; returns whether it was added.
    pub fn insert_pattern(&mut self, pattern: &str, vendor: &str) -> bool {
        let pattern = normalize_code(pattern);
        let vendor = vendor.trim();
        if pattern.is_empty() || vendor.is_empty() {
            return false;
        }
        if self
            .patterns
            .iter()
            .any(|r| r.pattern == pattern && r.vendor == vendor)
        {
            return false;
        }
        self.patterns.push(PatternRule::new(pattern, vendor));
        true
    }

    /// Remove every rule with this (normalized) pattern. Returns how many were removed.
    pub fn remove_pattern(&mut self, pattern: &str) -> usize {
        let pattern = normalize_code(pattern);
        let before = self.patterns.len();
        self.patterns.retain(|r| r.pattern != pattern);
        before - self.patterns.len()
    }
}

fn builtin_patterns() -> Vec<PatternRule> {
    vec![
        PatternRule::new("xxxxx", "Dell"),
        PatternRule::new("0xxxxx", "Dell"),
        PatternRule::new("xxxxxx-xxx", "HPE"),
    ]
}

// ── Wire shapes ─────────────────────────────────────────────────────

/// Whatever the mapping store or the local cache hands us: either
/// `{exact: {...}, patterns: [...]}` or a legacy flat `{code: vendor}` object.
#[derive(Deserialize)]
struct RawMappingPayload(HashMap<String, Value>);

impl From<RawMappingPayload> for PnMappingTable {
    fn from(raw: RawMappingPayload) -> Self {
        let mut fields = raw.0;
        let mut table = PnMappingTable::new();

        if !fields.contains_key("exact") && !fields.contains_key("patterns") {
            // Legacy shape: the whole object is the exact table.
            for (code, vendor) in &fields {
                if let Value::String(vendor) = vendor {
                    table.insert_exact(code, vendor);
                }
            }
            for rule in builtin_patterns() {
                table.insert_pattern(&rule.pattern, &rule.vendor);
            }
            return table;
        }

        if let Some(Value::Object(exact)) = fields.remove("exact") {
            for (code, vendor) in &exact {
                if let Value::String(vendor) = vendor {
                    table.insert_exact(code, vendor);
                }
            }
        }

        if let Some(Value::Array(rules)) = fields.remove("patterns") {
            for rule in rules {
                if let Ok(rule) = serde_json::from_value::<PatternRule>(rule) {
                    table.insert_pattern(&rule.pattern, &rule.vendor);
                }
            }
        }

        table
    }
}
