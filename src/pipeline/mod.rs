//! Email classification pipeline.
//!
//! Every request flows through:
//! 1. `EmailContent::new()`: rejects blank input before any LLM call
//! 2. `Classifier::classify()`: LLM categorization, coerced into a fixed schema
//! 3. `ResponseDrafter::draft()`: LLM reply, always signed
//!
//! Malformed model output never fails a request. Only configuration and
//! transport failures propagate.

pub mod classifier;
pub mod drafter;
pub mod processor;
pub mod types;

pub use classifier::Classifier;
pub use drafter::ResponseDrafter;
pub use processor::EmailProcessor;
pub use types::{Category, ClassificationResponse, ClassificationResult, EmailContent, Signature};
