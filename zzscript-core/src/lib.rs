//! This library implements the scripting core of a tile-based game engine.
//!
//! Scripts attached to board entities are written in a small line-oriented
//! language with labels and jumps. The library turns script text into
//! a flat list of executable commands and runs that list one step per game
//! tick, on behalf of the entity that owns the script.
//!
//! Processing happens in a few distinct stages:
//!
//! - [`lexer`] cuts raw text into [`Token`]s,
//! - [`machine::parse`] provides a parser-combinator engine operating on
//!   token streams, and [`machine::script::grammar`] composes it into the
//!   script language grammar,
//! - [`machine::script`] linearizes parsed statements into a [`Script`],
//!   a command list together with a label index table,
//! - [`machine::exec`] holds the [`ExecutionContext`], the interpreter
//!   advancing a single entity's script tick by tick.
//!
//! On top of that the library ships a minimal [`Board`] host, a collection of
//! script-owning entities that can be stepped and saved to a [`Snapshot`].
//!
//! # Using the library
//!
//! ```toml
//! zzscript-core = "0.1.0"
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use zzscript_core::{Board, Script};
//!
//! let script = Script::compile("guard", ":start\nSay \"halt!\"\nEnd\n").unwrap();
//! let mut board = Board::default();
//! let guard = board.spawn("guard", Some(Arc::new(script))).unwrap();
//! board.step().unwrap();
//! assert_eq!(board.entity(guard).unwrap().output, vec!["halt!".to_string()]);
//! ```
//!
//! See crate's `Cargo.toml` for a full listing of available features.

#[macro_use]
extern crate serde;
#[macro_use]
extern crate log;

// reexports
pub use board::Board;
pub use config::EngineConfig;
pub use entity::Entity;
pub use error::{Error, Result};
pub use machine::exec::{ContextSnapshot, ExecutionContext};
pub use machine::script::Script;
pub use machine::{ControlResult, Owner};
pub use snapshot::Snapshot;
pub use token::{Token, TokenKind};
pub use var::Var;

pub mod board;
pub mod config;
pub mod entity;
pub mod error;
pub mod lexer;
pub mod machine;
pub mod snapshot;
pub mod token;
pub mod var;

mod util;

// features
pub const FEATURE_NAME_PRETTY_ERRORS: &str = "pretty_errors";
#[cfg(not(feature = "pretty_errors"))]
pub const FEATURE_PRETTY_ERRORS: bool = false;
#[cfg(feature = "pretty_errors")]
pub const FEATURE_PRETTY_ERRORS: bool = true;

pub const FEATURE_NAME_LZ4: &str = "lz4";
#[cfg(not(feature = "lz4"))]
pub const FEATURE_LZ4: bool = false;
#[cfg(feature = "lz4")]
pub const FEATURE_LZ4: bool = true;

pub const FEATURE_NAME_YAML: &str = "yaml";
#[cfg(not(feature = "yaml"))]
pub const FEATURE_YAML: bool = false;
#[cfg(feature = "yaml")]
pub const FEATURE_YAML: bool = true;

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");

/// File extension used for script files.
pub const SCRIPT_FILE_EXTENSION: &str = "zzs";

/// Maximum number of chained label jumps a context performs within a single
/// tick before yielding.
pub const DEFAULT_JUMP_BUDGET: usize = 5;

/// Integer number type used for script variables.
pub type Int = i64;
/// Floating point number type used for script variables.
pub type Float = f64;

/// Entity unique integer identifier type.
pub type EntityId = u32;
