use std::cmp::Ordering;

use crate::models::mapping::normalize_code;

/// One element of a part-number pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternToken {
    /// Must equal this (uppercased) character
    Literal(char),
    /// `X`: exactly one ASCII digit
    Digit,
    /// `*`: exactly one non-whitespace character
    AnyOne,
    /// `+`: one or more non-whitespace characters
    AnyMany,
}

impl PatternToken {
    fn is_wildcard(&self) -> bool {
        !matches!(self, PatternToken::Literal(_))
    }

    fn accepts(&self, c: char) -> bool {
        match self {
            PatternToken::Literal(l) => *l == c,
            PatternToken::Digit => c.is_ascii_digit(),
            PatternToken::AnyOne | PatternToken::AnyMany => !c.is_whitespace(),
        }
    }
}

/// A tokenized pattern plus the figures used to rank competing matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    source: String,
    tokens: Vec<PatternToken>,
}

impl CompiledPattern {
    /// Tokenize a pattern. Returns `None` for a pattern that is blank after normalization.
    pub fn parse(pattern: &str) -> Option<Self> {
        let source = normalize_code(pattern);
        if source.is_empty() {
            return None;
        }
        let tokens = source
            .chars()
            .map(|c| match c {
                'X' => PatternToken::Digit,
                '*' => PatternToken::AnyOne,
                '+' => PatternToken::AnyMany,
                other => PatternToken::Literal(other),
            })
            .collect();
        Some(Self { source, tokens })
    }

    /// Normalized pattern text, e.g. "0XXXXX".
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    pub fn literal_count(&self) -> usize {
        self.tokens.iter().filter(|t| !t.is_wildcard()).count()
    }

    pub fn wildcard_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_wildcard()).count()
    }

    /// Pattern length in characters.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whole-string, case-insensitive match against a part number.
    pub fn matches(&self, code: &str) -> bool {
        let chars: Vec<char> = normalize_code(code).chars().collect();
        let n = chars.len();

        // reachable[j]: the tokens consumed so far can end exactly before chars[j].
        let mut reachable = vec![false; n + 1];
        reachable[0] = true;

        for token in &self.tokens {
            let mut next = vec![false; n + 1];
            match token {
                PatternToken::AnyMany => {
                    // Carries forward while characters keep being accepted.
                    let mut open = false;
                    for j in 0..n {
                        open = (open || reachable[j]) && token.accepts(chars[j]);
                        next[j + 1] = open;
                    }
                }
                _ => {
                    for j in 0..n {
                        if reachable[j] && token.accepts(chars[j]) {
                            next[j + 1] = true;
                        }
                    }
                }
            }
            if !next.iter().any(|&r| r) {
                return false;
            }
            reachable = next;
        }

        reachable[n]
    }

    /// Ranking between two matching patterns: more literals first, then longer
    /// patterns, then fewer wildcards. `Ordering::Less` means `self` ranks higher.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .literal_count()
            .cmp(&self.literal_count())
            .then_with(|| other.len().cmp(&self.len()))
            .then_with(|| self.wildcard_count().cmp(&other.wildcard_count()))
    }
}
