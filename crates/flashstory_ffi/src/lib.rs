//! Flutter bridge for `flashstory_core`.

pub mod api;
