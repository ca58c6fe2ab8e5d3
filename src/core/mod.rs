//! Core data types for parsed sequence entries.
//!
//! This module provides the value types every format parser fills in:
//!
//! - [`record::SeqRecord`]: one logical sequence entry with its annotation
//! - [`types::SeqType`], [`types::TypeRequest`]: residue alphabets and the
//!   type check applied by the dispatcher
//! - [`quality::QualityScale`]: quality byte decoding per sequencing convention
//! - [`description::ProteinDescription`]: the structured UniProt `DE` tree
//! - [`citation::Citation`], [`citation::XRef`], [`citation::Gene`],
//!   [`citation::SeqDates`]: annotation sub-records
//! - [`features::FeatureTable`]: the feature layer seam
//!
//! ## Sequence Types
//!
//! | Code | Type | Unknown residue |
//! |------|------|-----------------|
//! | N | Nucleotide | `N` |
//! | P | Protein | `X` |

pub mod citation;
pub mod description;
pub mod features;
pub mod quality;
pub mod record;
pub mod types;
