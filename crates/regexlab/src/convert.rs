//! Rendering a pattern as regex-construction code for other languages.
//!
//! [`convert`] is pure string templating: the pattern is substituted
//! verbatim into each target's construction idiom. Nothing is escaped and
//! nothing is validated, so a pattern containing a target's delimiter
//! (a `/` for JavaScript, a `"` for Rust raw strings) produces output that
//! is textually faithful but will not compile in that target.
//!
//! # Example
//!
//! ```
//! use regexlab::convert::{Target, Variant, convert};
//!
//! let table = convert(r"\d+");
//! assert_eq!(table.get(Target::JavaScript, Variant::Global), Some(r"/\d+/g"));
//! assert_eq!(table.get(Target::Rust, Variant::Standard), Some(r#"Regex::new(r"\d+")"#));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// JavaScript flag requesting all matches.
pub const JS_GLOBAL_FLAG: &str = "g";

/// JavaScript flag requesting case-insensitive matching.
pub const JS_CASE_INSENSITIVE_FLAG: &str = "i";

/// Inline case-insensitivity modifier shared by the RE2/Rust dialects.
const INLINE_CASE_INSENSITIVE: &str = "(?i)";

/// A target language ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// JavaScript regex literals.
    JavaScript,
    /// The `regex` crate.
    Rust,
    /// `java.util.regex.Pattern`.
    Java,
    /// Go's `regexp` package.
    Go,
    /// Python's `re` module.
    Python,
}

impl Target {
    /// All targets, in table order.
    pub const ALL: [Self; 5] = [
        Self::JavaScript,
        Self::Rust,
        Self::Java,
        Self::Go,
        Self::Python,
    ];

    /// Get the key used in serialized tables.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::Rust => "rust",
            Self::Java => "java",
            Self::Go => "go",
            Self::Python => "python",
        }
    }

    /// Get the human-readable language name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::JavaScript => "JavaScript",
            Self::Rust => "Rust",
            Self::Java => "Java",
            Self::Go => "Go",
            Self::Python => "Python",
        }
    }

    /// Variants this target renders, in table order.
    #[must_use]
    pub const fn variants(self) -> &'static [Variant] {
        match self {
            Self::JavaScript => &[
                Variant::Standard,
                Variant::Global,
                Variant::CaseInsensitive,
                Variant::GlobalCaseInsensitive,
            ],
            Self::Rust | Self::Java | Self::Go | Self::Python => {
                &[Variant::Standard, Variant::CaseInsensitive]
            }
        }
    }

    /// Render one variant of `pattern` for this target.
    ///
    /// Returns `None` when the target has no such variant.
    #[must_use]
    pub fn render(self, variant: Variant, pattern: &str) -> Option<String> {
        let snippet = match (self, variant) {
            (Self::JavaScript, _) => js_literal(pattern, &variant.js_flags()),
            (Self::Rust, Variant::Standard) => format!(r#"Regex::new(r"{pattern}")"#),
            (Self::Rust, Variant::CaseInsensitive) => {
                format!(r#"Regex::new(r"{INLINE_CASE_INSENSITIVE}{pattern}")"#)
            }
            (Self::Java, Variant::Standard) => format!(r#"Pattern.compile("{pattern}")"#),
            (Self::Java, Variant::CaseInsensitive) => {
                format!(r#"Pattern.compile("{pattern}", Pattern.CASE_INSENSITIVE)"#)
            }
            (Self::Go, Variant::Standard) => format!("regexp.MustCompile(`{pattern}`)"),
            (Self::Go, Variant::CaseInsensitive) => {
                format!(r#"regexp.MustCompile("{INLINE_CASE_INSENSITIVE}" + `{pattern}`)"#)
            }
            (Self::Python, Variant::Standard) => format!("re.compile(r'{pattern}')"),
            (Self::Python, Variant::CaseInsensitive) => {
                format!("re.compile(r'{pattern}', re.IGNORECASE)")
            }
            (Self::Rust | Self::Java | Self::Go | Self::Python, _) => return None,
        };
        Some(snippet)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A flavor of construction snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// The pattern as-is.
    Standard,
    /// Find all matches (JavaScript only).
    Global,
    /// Case-insensitive matching.
    CaseInsensitive,
    /// Both global and case-insensitive (JavaScript only).
    GlobalCaseInsensitive,
}

impl Variant {
    /// Get the key used in serialized tables.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Global => "global",
            Self::CaseInsensitive => "case_insensitive",
            Self::GlobalCaseInsensitive => "global_case_insensitive",
        }
    }

    /// JavaScript flag string for this variant.
    ///
    /// The combined variant is the union of the global and case-insensitive
    /// flags, global first.
    #[must_use]
    pub fn js_flags(self) -> String {
        match self {
            Self::Standard => String::new(),
            Self::Global => JS_GLOBAL_FLAG.to_string(),
            Self::CaseInsensitive => JS_CASE_INSENSITIVE_FLAG.to_string(),
            Self::GlobalCaseInsensitive => {
                [Self::Global.js_flags(), Self::CaseInsensitive.js_flags()].concat()
            }
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn js_literal(pattern: &str, flags: &str) -> String {
    format!("/{pattern}/{flags}")
}

/// Snippets for every supported target, keyed by target then variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConversionTable {
    entries: BTreeMap<Target, BTreeMap<Variant, String>>,
}

impl ConversionTable {
    /// Get one snippet.
    #[must_use]
    pub fn get(&self, target: Target, variant: Variant) -> Option<&str> {
        self.entries
            .get(&target)
            .and_then(|variants| variants.get(&variant))
            .map(String::as_str)
    }

    /// Get all snippets for a target.
    #[must_use]
    pub fn target(&self, target: Target) -> Option<&BTreeMap<Variant, String>> {
        self.entries.get(&target)
    }

    /// Iterate over `(target, variant, snippet)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Target, Variant, &str)> {
        self.entries.iter().flat_map(|(target, variants)| {
            variants
                .iter()
                .map(move |(variant, snippet)| (*target, *variant, snippet.as_str()))
        })
    }

    /// Number of targets present.
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of snippets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// Check if the table holds no snippets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render `pattern` for every target and variant.
#[must_use]
pub fn convert(pattern: &str) -> ConversionTable {
    let entries = Target::ALL
        .iter()
        .map(|&target| {
            let variants = target
                .variants()
                .iter()
                .filter_map(|&variant| {
                    target
                        .render(variant, pattern)
                        .map(|snippet| (variant, snippet))
                })
                .collect();
            (target, variants)
        })
        .collect();
    ConversionTable { entries }
}
