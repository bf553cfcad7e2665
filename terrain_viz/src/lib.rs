//! Core library for the Mapterhorn terrain visualization.
//!
//! The crate is headless: everything that touches a renderer goes through
//! the [`map::MapSurface`] capability trait, so the same glue logic drives a
//! real map adapter or the in-memory [`map::HeadlessMap`].

pub mod app;
pub mod building;
pub mod config;
pub mod contour;
pub mod controls;
pub mod elevation;
pub mod error;
pub mod events;
pub mod geometry;
pub mod gis;
pub mod io;
pub mod layers;
pub mod map;
pub mod presets;
pub mod style;
pub mod viewpoints;

pub use error::{Error, Result};
