//! Flutter-facing bindings for the TaskMaster core.

pub mod api;
