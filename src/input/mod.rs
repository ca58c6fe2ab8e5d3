//! Everything about one open input.
//!
//! - [`source`]: buffered line/byte reader with a reset point
//! - [`usa`]: sequence addresses (`[format::]path[:entry][[begin:end[:r]]]`)
//! - [`query`]: entry selection by id, accession, organism and so on
//! - [`options`]: caller-tunable read options
//! - [`session`]: [`SeqInput`], the per-input state carried between reads

pub mod options;
pub mod query;
pub mod session;
pub mod source;
pub mod usa;

pub use options::ReadOptions;
pub use query::EntryQuery;
pub use session::SeqInput;
pub use source::LineSource;
pub use usa::SeqAddress;
