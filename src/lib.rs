//! Aurora Alert terminal client.
//!
//! The binary is a thin command surface over the session controller; this
//! library holds the bootstrap and the command handlers so they can be
//! driven from integration tests.

pub mod bootstrap;
pub mod cli;
