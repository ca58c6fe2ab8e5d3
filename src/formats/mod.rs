//! Format registry and dispatch engine.
//!
//! - [`registry`]: the ordered table of known formats and name lookup
//! - [`dispatch`]: [`crate::SeqInput::read`], which tries candidate formats
//!   and classifies every attempt

pub mod dispatch;
pub mod registry;

pub use dispatch::Outcome;
pub use registry::{find_format, is_known_format, list_formats, FormatDescriptor, FormatId};
