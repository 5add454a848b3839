//! Match engine business logic: draft, scoring, bracket and group stage.
//!
//! Everything here works on plain data; locking and permissions live in [`crate::engine`].

pub mod ban_pick;
pub mod bracket;
pub mod group_stage;
pub mod rating;
pub mod scoring;
