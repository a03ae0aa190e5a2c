//! Domain models for encrypty.
//!
//! # Core Concepts
//!
//! - [`FileHandle`]: Opaque handle to a selected file's content. Content is
//!   resolved lazily, only when a submission is built.
//! - [`ManifestItem`]: A file handle paired with the `/`-separated relative path
//!   it was selected or dropped under.
//! - [`Action`]: What the remote processor should do with the batch.
//! - [`NavigationTarget`]: Where the client goes after a successful submission.

mod action;
mod item;
mod navigation;

pub use action::*;
pub use item::*;
pub use navigation::*;
