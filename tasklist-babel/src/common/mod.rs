//! Contains logic for mapping between the event stream and the syntax tree.

pub mod flat_to_nested;
