// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod codec;
pub mod controller;
pub mod error;
pub mod form;
pub mod runtime;
pub mod store;
pub mod workout;
