//! Data models for the Bookshelf backend.
//!
//! Field names on the persisted shapes match the existing document schema so
//! stored records and API payloads stay wire-compatible.

mod account;
mod bookmark;
mod command;
mod folder;

pub use account::*;
pub use bookmark::*;
pub use command::*;
pub use folder::*;
