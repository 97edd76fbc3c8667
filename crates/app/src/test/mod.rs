//! Shared test support.

pub(crate) mod fixtures;
