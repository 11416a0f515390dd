//! Shared helpers.

pub mod checksum;
