//! Test-only support: fixture grammars compiled to runtime tables, the
//! builders that produce them, and a spying text source for reuse
//! assertions. Nothing here ships with the parsing core — languages reach
//! the runtime as opaque tables.

pub mod grammars;
pub mod lexgen;
pub mod lrgen;
mod spy;

pub use spy::SpyInput;
