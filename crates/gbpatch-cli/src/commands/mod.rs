//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod apply;
pub mod list;
pub mod offset_utils;
pub mod tile;
