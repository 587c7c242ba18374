//! # Siakad Architecture
//!
//! Siakad is a **UI-agnostic student directory library** with a CLI client. It
//! keeps student records in a document store, gates every write behind local
//! validation, and caches the signed-in identity on the device.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs, print.rs)                     │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Validates, then dispatches                               │
//! │  - Sign-in, registration and sign-out flows                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────┬──────────────────────┬───────────────┐
//! │  directory/          │  session.rs          │  auth/        │
//! │  student CRUD and    │  identity and        │  provider     │
//! │  prefix search       │  remember-me cache   │  capability   │
//! └──────────────────────┴──────────────────────┴───────────────┘
//!            │                      │
//!            ▼                      ▼
//! ┌──────────────────────┬──────────────────────────────────────┐
//! │  store/              │  kv/                                 │
//! │  DocumentStore trait │  KeyValueStore trait                 │
//! │  file + memory impls │  file + memory impls                 │
//! └──────────────────────┴──────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust arguments, returns Rust types, and
//! never writes to stdout/stderr. Diagnostics go through `tracing`; the binary
//! decides where they end up.
//!
//! ## Testing Strategy
//!
//! 1. **Operations** (`directory/*.rs`, `session.rs`, `validation.rs`):
//!    thorough unit tests against the in-memory stores.
//! 2. **API** (`api.rs`): flow tests with a scripted auth provider.
//! 3. **CLI** (`tests/cli.rs`): end-to-end runs of the binary against a
//!    temporary data directory.
//!
//! ## Module Overview
//!
//! - **[`api`]**: facade used by every UI
//! - **[`directory`]**: student repository and user profiles
//! - **[`session`]**: identity and remembered-credential cache
//! - **[`auth`]**: provider trait, error codes and messages, local provider
//! - **[`validation`]**: field rules shared by every form
//! - **[`store`]**: document store abstraction
//! - **[`kv`]**: key-value store abstraction
//! - **[`model`]**: record and input types
//! - **[`config`]**: layered configuration
//! - **[`error`]**: error types

pub mod api;
pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod kv;
pub mod model;
pub mod session;
pub mod store;
pub mod validation;
