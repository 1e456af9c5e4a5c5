//! Workout log pinned to map coordinates.
//!
//! [`app::App`] owns the collection and drives three views of it: map
//! markers, list entries and the stored JSON array. Everything outside the
//! process (map widget, list region, alerts, position, storage) comes in
//! through the traits in [`view`], [`geo`] and [`storage`].

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod geo;
pub mod persist;
pub mod storage;
pub mod types;
pub mod utils;
pub mod view;
pub mod workout;
