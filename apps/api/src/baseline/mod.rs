// Baseline report engine.
// Stages run in order: eligibility → per-photo analysis → aggregate scoring → assembly.
// Every stage except the store calls is pure and synchronous.

pub mod aggregate;
pub mod eligibility;
pub mod generator;
pub mod handlers;
pub mod heuristics;
pub mod photo_analysis;
pub mod pipeline;
