//! Random string generation from a character distribution.
//!
//! This crate provides:
//! - A streaming text decoder/encoder for several encodings, tolerant of
//!   multi-byte sequences split across reads
//! - Character occurrence counting and cumulative distributions
//! - Inverse-transform sampling driven by one of three pseudorandom backends
//! - A block-wise writer producing output files of any length
//!
//! The usual entry point is `model::generator::Generator`, built from a
//! `config::Config`.

/// Conversion between encoded bytes and the internal representation.
pub mod codec;

/// Run configuration.
pub mod config;

/// Uniform `u32` draw sources.
pub mod draw;

/// Error types.
pub mod error;

/// Distribution model, sampler and generation pipeline.
pub mod model;

/// Block-wise streaming reader and writer.
pub mod stream;

/// File helpers (opening input, creating output).
///
/// Not exposed
pub(crate) mod io;
