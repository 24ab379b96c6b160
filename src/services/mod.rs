// src/services/mod.rs

pub mod catalog;
pub mod progress;
pub mod scoring;

pub use catalog::QuizCatalog;
pub use progress::ProgressLedger;
pub use scoring::ScoringEngine;
