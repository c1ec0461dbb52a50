//! Battle City: a single-level tank battle on a 13×13 tile map.
//!
//! The library holds the simulation only. Terminal drawing and event
//! wiring live in the binary.

pub mod compute;
pub mod config;
pub mod entities;
pub mod grid;
pub mod input;
