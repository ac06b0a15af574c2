//! Design Lens - AI-powered design diagnosis
//!
//! This library scores a design image across five dimensions using one of
//! several hosted vision providers, an offline generator, or a fallback chain
//! across the hosted providers.

// Allow certain clippy warnings that are either stylistic or from external dependencies
#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::format_push_string)] // Performance improvement but stylistic
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough
#![allow(clippy::items_after_statements)] // Locally-scoped use statements are fine

pub mod analysis;
pub mod cli;
pub mod common;
pub mod config;
pub mod error;
pub mod factory;
pub mod fallback;
pub mod image;
pub mod logger;
pub mod providers;
pub mod types;
pub mod ui;

// Re-export important structs and functions for easier testing
pub use analysis::AnalysisService;
pub use config::Config;
pub use error::AnalysisError;
pub use factory::{ServiceFactory, create_service};
pub use fallback::SmartAnalyzer;
pub use image::ImageFile;
pub use providers::{Provider, ProviderConfig};
pub use types::{DiagnosisResult, Dimension, DimensionResult, ScoreLevel};
