//! Google Gemini feedback generator.

pub mod client;
pub mod types;

pub use client::GeminiFeedbackGenerator;
