//! Library half of the `tasklist` binary, shared with its integration tests.

pub mod transforms;
