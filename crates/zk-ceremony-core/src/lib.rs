//! Core library for the zk-ceremony coordinator toolkit.
//!
//! Provides the ceremony data model and the assembly pipeline that turns a
//! directory of R1CS circuit files into a fully-staged trusted-setup ceremony:
//! metadata extraction, powers-of-tau sizing, parameter-file caching, initial
//! zkey computation, artifact staging into durable storage, and final
//! registration with the coordinator backend.
//!
//! External collaborators are reached through traits so the pipeline can be
//! driven end-to-end in tests with in-memory fakes:
//! - [`engine::SetupEngine`] — the snarkjs toolchain
//! - [`cache::PtauSource`] — the remote powers-of-tau mirror
//! - [`storage::CeremonyStorage`] — durable object storage
//! - [`registry::CeremonyRegistry`] — the coordinator backend
//! - [`collector::CollectorPrompt`] — the interactive circuit collection UI

pub mod cache;
pub mod ceremony;
pub mod collector;
pub mod config;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod paths;
pub mod powers;
pub mod registry;
pub mod staging;
pub mod storage;
