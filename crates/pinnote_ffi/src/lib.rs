//! Flutter-facing bindings for `pinnote_core`.

pub mod api;
