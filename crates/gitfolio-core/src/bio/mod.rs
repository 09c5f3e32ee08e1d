//! Bio Resolver
//!
//! Produces the "about me" text from one of four sources: a configured
//! generative service, a previously cached result, a deterministic fallback,
//! or nothing at all (user skip).
//!
//! - `cache`: username -> bio JSON cache file
//! - `generator`: `BioGenerator` trait + OpenAI-backed implementation
//! - `resolver`: resolution priority and failure recovery

pub mod cache;
pub mod generator;
pub mod resolver;

// Re-exports
pub use cache::BioCache;
pub use generator::{compose_prompt, fallback_bio, BioGenerator, OpenAiGenerator};
pub use resolver::{BioRequest, BioResolver, RecoveryChoice, RecoveryPrompt};
