//! Controller-side actions applied to `core-model`/`core-state`.
//!
//! `search_ops` is the REX-backed find/replace surface ("REX is a library
//! consumed by the controller for find/replace operations"), wired through
//! `core_text::search::find_text` and `core-config`'s `[search]` defaults.
//! `io_ops` is kept from the teacher: file-IO line-ending normalization on
//! open/write carries over unchanged.

pub mod io_ops;
pub mod search_ops;

pub use search_ops::{find_in_active_buffer, FindOutcome, FindRequest};
