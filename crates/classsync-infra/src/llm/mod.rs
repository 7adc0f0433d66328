//! LLM-backed feedback generators.

pub mod gemini;
