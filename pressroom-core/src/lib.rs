//! Analytical core of Pressroom: document classification, record/prose
//! coherence, coverage scoring, template suggestions and evidence
//! confidence for campaign press releases.
//!
//! Everything except suggestion generation and evidence discovery is pure
//! and synchronous. Rule tables live in a [`Lexicon`] passed in by the
//! caller; [`Lexicon::builtin`] provides the defaults.
//!
//! # Examples
//! ```
//! use pressroom_core::{classify_document, score_evidence, EvidenceCandidate, Lexicon};
//!
//! let lexicon = Lexicon::builtin();
//! let doc = classify_document(
//!     "For Immediate Release. Contact: ### Candidate announces candidacy for Senate.",
//!     &lexicon.documents,
//! );
//! assert_eq!(doc.primary_type, "Press Release");
//!
//! let evidence = EvidenceCandidate {
//!     url: "https://www.congress.gov/bill/118".into(),
//!     excerpt: Some("The senator voted for the bill.".into()),
//! };
//! let result = score_evidence("Senator voted for the bill", &evidence, "voting_record", lexicon);
//! assert!(result.meets_threshold);
//! ```
pub mod classify;
pub mod coherence;
pub mod discovery;
pub mod entities;
pub mod evidence;
pub mod lexicon;
pub mod parity;
pub mod templates;

pub use classify::{analyze_text, classify_document, Classification, TextStats};
pub use coherence::{
    analyze_coherence, score_coverage, CoherenceAnalysis, CoverageReport, FieldKey, Gap, Placement,
    WeightTable,
};
pub use discovery::{build_search_query, discover_and_score, discover_evidence, search_strategy};
pub use entities::{extract_entities, Entities};
pub use evidence::{
    evaluate_assertion_strength, required_threshold, score_evidence, AssertionStrength,
    ConfidenceLevel, ConfidenceResult, EvidenceCandidate,
};
pub use lexicon::Lexicon;
pub use parity::{check_parity, ParityReport};
pub use templates::{generate_suggestions, Suggestion, TemplateLibrary};
