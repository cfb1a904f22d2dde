//! Tolerant interpretation of free-form model replies.
//!
//! Three tiers, first success wins:
//! 1. structured: decode the span from the first `{` to the last `}` as JSON
//! 2. keyword: case-insensitive scan for a recyclable category name
//! 3. failed: `Other` with low confidence
//!
//! Interpretation never fails; a malformed reply degrades to a lower tier.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::{fmt, str::FromStr, sync::LazyLock};
use thiserror::Error;

static JSON_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Greedy: first '{' through last '}', across newlines
    Regex::new(r"(?s)\{.*\}").unwrap()
});

const DEFAULT_CONFIDENCE: f64 = 0.5;
const KEYWORD_CONFIDENCE: f64 = 0.7;
const FAILED_CONFIDENCE: f64 = 0.3;
const FAILED_REASONING: &str = "Parse failed";

/// Fixed waste classes used for pricing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Plastic,
    Paper,
    Metal,
    Glass,
    Organic,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Plastic,
        Category::Paper,
        Category::Metal,
        Category::Glass,
        Category::Organic,
        Category::Other,
    ];

    /// Keyword fallback priority; `Other` is never matched by keyword
    pub const KEYWORD_ORDER: [Category; 5] = [
        Category::Plastic,
        Category::Paper,
        Category::Metal,
        Category::Glass,
        Category::Organic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Plastic => "Plastic",
            Category::Paper => "Paper",
            Category::Metal => "Metal",
            Category::Glass => "Glass",
            Category::Organic => "Organic",
            Category::Other => "Other",
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            Category::Plastic => "plastic",
            Category::Paper => "paper",
            Category::Metal => "metal",
            Category::Glass => "glass",
            Category::Organic => "organic",
            Category::Other => "other",
        }
    }

    /// Map a model-supplied label to a category; unrecognised labels become `Other`
    pub fn from_label(label: &str) -> Category {
        label.parse().unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Case-insensitive; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Outcome of interpreting one model reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub category: Category,
    /// Always within [0, 1]
    pub confidence: f64,
    pub reasoning: String,
}

/// Which tier produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseTier {
    Structured,
    Keyword,
    Failed,
}

impl ParseTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseTier::Structured => "structured",
            ParseTier::Keyword => "keyword",
            ParseTier::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub classification: Classification,
    pub tier: ParseTier,
}

/// Why the structured tier gave up
#[derive(Debug, Error)]
enum StructuredError {
    #[error("no JSON object in reply")]
    NoJsonBlock,
    #[error("JSON syntax error: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("JSON block is not an object")]
    NotAnObject,
    #[error("'class' is not a string: {0}")]
    ClassNotText(Value),
    #[error("'confidence' is not a number: {0}")]
    Confidence(Value),
}

/// Interpret a raw model reply. Always yields a classification.
pub fn interpret(text: &str) -> Interpretation {
    match parse_structured(text) {
        Ok(classification) => {
            return Interpretation {
                classification,
                tier: ParseTier::Structured,
            }
        }
        Err(e) => tracing::debug!(reason = %e, "Structured parse failed, trying keyword scan"),
    }

    if let Some(classification) = scan_keywords(text) {
        return Interpretation {
            classification,
            tier: ParseTier::Keyword,
        };
    }

    tracing::debug!("No category keyword in model reply");
    Interpretation {
        classification: Classification {
            category: Category::Other,
            confidence: FAILED_CONFIDENCE,
            reasoning: FAILED_REASONING.to_string(),
        },
        tier: ParseTier::Failed,
    }
}

fn parse_structured(text: &str) -> Result<Classification, StructuredError> {
    let block = JSON_BLOCK_RE
        .find(text)
        .ok_or(StructuredError::NoJsonBlock)?;

    let value: Value = serde_json::from_str(block.as_str())?;
    let object = value.as_object().ok_or(StructuredError::NotAnObject)?;

    let category = match object.get("class") {
        None => Category::Other,
        Some(Value::String(label)) => {
            let category = Category::from_label(label);
            if category == Category::Other && !label.trim().eq_ignore_ascii_case("other") {
                tracing::debug!(label = %label, "Unrecognised class label, using Other");
            }
            category
        }
        Some(other) => return Err(StructuredError::ClassNotText(other.clone())),
    };

    let confidence = match object.get("confidence") {
        None => DEFAULT_CONFIDENCE,
        Some(value) => coerce_confidence(value)?,
    };

    let reasoning = match object.get("reasoning") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    Ok(Classification {
        category,
        confidence,
        reasoning,
    })
}

/// Accepts a JSON number or a numeric string, clamped into [0, 1]
fn coerce_confidence(value: &Value) -> Result<f64, StructuredError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => Ok(n.clamp(0.0, 1.0)),
        _ => Err(StructuredError::Confidence(value.clone())),
    }
}

fn scan_keywords(text: &str) -> Option<Classification> {
    let lowered = text.to_lowercase();

    Category::KEYWORD_ORDER
        .into_iter()
        .find(|category| lowered.contains(category.keyword()))
        .map(|category| Classification {
            category,
            confidence: KEYWORD_CONFIDENCE,
            reasoning: format!("Detected {}", category.keyword()),
        })
}
