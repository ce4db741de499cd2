//! Core use-case services.
//!
//! # Responsibility
//! - Combine remote content with persisted engagement state into
//!   view-ready models.
//! - Keep UI/FFI layers decoupled from storage and transport details.

pub mod catalog;
pub mod collection_reader;
pub mod engagement_service;
pub mod feed_sequencer;
pub mod position_tracker;
pub mod saved_posts;
