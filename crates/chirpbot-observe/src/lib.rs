//! Observability for chirpbot: tracing subscriber setup.

pub mod tracing_setup;
