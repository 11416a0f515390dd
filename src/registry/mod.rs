//! In-memory patient registry with an append-only durable log.
//!
//! Mutations are mutually exclusive; lookups run concurrently with them and
//! see either the state before or after a mutation, never a partial one.
//! Every acknowledged mutation has been appended to the patient log first.

pub mod store;

pub use store::{PatientRegistry, RegistryError, ReplaySummary};
