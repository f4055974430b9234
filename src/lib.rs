//! patmux is an HTTP request multiplexer with pat-style routes.
//!
//! Routes are registered under patterns that name exact paths
//! (`/favicon.ico`), rooted subtrees (`/images/`), or templates with named
//! captures (`/users/:id`, `/files/v-:version/`), optionally qualified by
//! host (`example.com/admin/`). Each request goes to the longest matching
//! pattern, and captured values are handed to the handler.
//!
//! # Architecture
//!
//! - [`mux`] -- The multiplexer: pattern compilation and matching, the
//!   route registry, path canonicalization, and request dispatch.
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate, resolve).
//! - [`config`] -- Route table file loading and validation via the
//!   [`ConfigSource`](config::ConfigSource) trait.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`routes`] -- Turns a loaded config into mux registrations.
//! - [`server`] -- Axum server setup, shared application state, and
//!   graceful shutdown.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod mux;
pub mod routes;
pub mod server;
