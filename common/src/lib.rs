//! Data model shared by the invoice generator front ends.
//!
//! Nothing in this crate touches the filesystem: it only knows how a seller and
//! an invoice row look, how they are validated, and how the result of a run is
//! reported back.

pub mod jobs;
pub mod model;
pub mod requests;
