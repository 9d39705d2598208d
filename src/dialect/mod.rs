//! Dialect tables.
//!
//! Each dialect module mirrors the output of the MAVLink code generator:
//! one `*_DATA` struct per message with its id, name, CRC_EXTRA seed, full
//! encoded length and targeting kind, plus a `MavMessage` enum tying them
//! together behind the [`Message`](crate::Message) trait. Tables are built
//! at compile time and safe to share between threads without
//! synchronization.
//!
//! The router works with any dialect; [`common`] bundles the subset of the
//! MAVLink `common` dialect used by this crate's tests and the
//! `mavrouterd` binary.

pub mod common;
