//! Stream relay for file_search answers.
//!
//! Consumes the SSE byte stream of an upstream response, forwards text
//! increments as they arrive and finishes with the full answer plus the
//! documents it was based on.
//!
//! Pipeline per request:
//! bytes → [`LineBuffer`] → [`parse_sse_line`] → [`UpstreamFrame::classify`]
//! → text accumulation + [`SourceRecord`] → [`enrich_sources`] → [`extract_sources`].
//!
//! [`StreamRelay::run`] drives it and reports through [`RelayEvent`]s;
//! [`answer_from_response`] covers the non-streaming case.

mod answer;
mod enrich;
mod error;
mod frame;
mod line_buffer;
mod relay;
mod sources;

pub use answer::{answer_from_response, extract_answer_text};
pub use enrich::{FileNameResolver, NoResolver, enrich_sources};
pub use error::RelayError;
pub use frame::{FileRef, UpstreamFrame, collect_file_refs};
pub use line_buffer::{LineBuffer, parse_sse_line};
pub use relay::{FinalAnswer, RelayEvent, RelayOptions, RelayOutcome, StreamRelay};
pub use sources::{
    SourceEntry, SourcePolicy, SourceRecord, display_name::display_name, extract_sources,
    text_sources::sources_from_text,
};
