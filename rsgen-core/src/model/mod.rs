//! Character distribution model and generation pipeline.
//!
//! This module provides:
//! - Codepoint occurrence counting (`OccurrenceTable`)
//! - Cumulative distributions for inverse-transform sampling (`CumulativeDistribution`)
//! - The discrete sampler (`Sampler`)
//! - A high-level pipeline from a configuration to an output file (`Generator`)

/// High-level interface running one generation pass.
///
/// Builds the distribution from the configured source, then samples,
/// encodes and writes the output in bounded blocks.
pub mod generator;

/// Frequency accumulator.
///
/// Counts codepoint occurrences block by block, builds uniform tables for
/// alphabets and ranges, and saves/loads tables with `postcard`.
pub mod occurrences;

/// Cumulative distribution over codepoints, searched by lower bound.
pub mod distribution;

/// Inverse-transform sampler driven by a `DrawSource`.
pub mod sampler;
