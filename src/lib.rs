//! # watch
//!
//! A tiny declarative language for describing dependency setup: clone a
//! repository, run commands in it, move the build output where it belongs.
//! Scripts compile to an ordered list of shell commands.
//!
//! ```text
//! clone "github.com/user/lib@v2" as "lib"
//! set "OUT=./vendor"
//! run "make -C $[lib]"
//! extract "$[lib]/build/liblib.a $[OUT]"
//! ```

pub mod cli;
pub mod config;
pub mod cursor;
pub mod error;
pub mod executor;
pub mod interpreter;
pub mod token;
pub mod tokenizer;

pub use config::Settings;
pub use error::{Error, ParseError};
pub use interpreter::{Interpreter, Program, parse_script};
