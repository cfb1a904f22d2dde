//! Response-interpretation pipeline: prompt construction, tolerant parsing of the
//! model's reply, and category-to-price mapping.

pub mod interpreter;
pub mod pricing;
pub mod prompt;

pub use interpreter::{interpret, Category, Classification, Interpretation, ParseTier};
pub use pricing::{ClassificationResult, DebugInfo, PricingTable};
pub use prompt::{build_classification_request, build_probe_request, CLASSIFICATION_PROMPT};
