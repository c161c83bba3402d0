#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

//! Command-line client for a remote VM management service.
//!
//! Layout:
//! - `cli.rs`: global options, endpoint setup, and command dispatch
//! - `commands/`: command table, arity rules, and request builders
//! - `client.rs`: endpoint client, request intents, and errors
//! - `output.rs`: response rendering
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;

pub use cli::run;
