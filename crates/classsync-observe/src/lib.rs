//! Observability for ClassSync: tracing subscriber setup and the span
//! field names used around AI feedback calls.

pub mod genai_attrs;
pub mod tracing_setup;
