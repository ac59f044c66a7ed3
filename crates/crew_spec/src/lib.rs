//! # crew_spec
//!
//! Structured output contract for the storycrew pipeline.
//!
//! The keyword extraction stage must hand a machine-checked record to the
//! story writer. This crate owns that record ([`KeywordSpec`]), the rules
//! that produce it from untrusted model output, and the helpers that dig
//! the JSON out of free-form LLM text.
//!
//! ## Rules
//!
//! - `primary_keywords`: 1–10 entries after trimming and case-insensitive dedupe
//! - `secondary_keywords`: 0–15 entries, same cleaning, independent of primary
//! - `audience`: 3–80 characters
//! - `tone`: one of informative, persuasive, narrative, technical, casual,
//!   formal; anything else is silently replaced by `informative`
//!
//! ## Example
//!
//! ```rust
//! use crew_spec::{KeywordSpecValidator, RawKeywordSpec, Tone};
//!
//! let raw = RawKeywordSpec::new(
//!     vec!["AI".into(), "ai".into(), "Health".into()],
//!     "rural clinicians",
//! )
//! .with_tone("Dramatic");
//!
//! let spec = KeywordSpecValidator::validate(raw).unwrap();
//! assert_eq!(spec.primary_keywords(), ["AI", "Health"]);
//! assert_eq!(spec.tone(), Tone::Informative);
//! ```

pub mod error;
pub mod models;
pub mod structured;
pub mod validator;

pub use error::{KeywordField, SpecError, SpecResult, ValidationError};
pub use models::{KeywordSpec, RawKeywordSpec, Tone};
pub use structured::{
    extract_json_object, json_object_candidates, parse_keyword_spec, parse_raw_keyword_spec,
};
pub use validator::{
    dedupe_keywords, KeywordSpecValidator, MAX_AUDIENCE_LEN, MAX_PRIMARY_KEYWORDS,
    MAX_SECONDARY_KEYWORDS, MIN_AUDIENCE_LEN,
};
