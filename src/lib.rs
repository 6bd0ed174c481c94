//! Library for manipulating id-Tech WAD archives, Doom map data, and PK3
//! (ZIP) archives.
//!
//! Layered bottom-up: [`codec`] gives byte-exact little-endian primitives;
//! [`imap`] is the stable-id collection every map record IMap is built on;
//! [`directory`] is the shared lump-sequence model both [`wad`] and [`zip`]
//! parse into and serialize out of; [`map`] holds the Doom map record types
//! and the [`map::DoomMap`] aggregate; [`host`] exposes all of the above
//! through the 1-based positional API a command-line collaborator uses.

pub mod cli;
pub mod codec;
pub mod directory;
pub mod error;
pub mod host;
pub mod imap;
pub mod map;
pub mod wad;
pub mod zip;

pub use error::{Result, WadkitError};
