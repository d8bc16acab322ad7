//! CMake File API client for compile command reconstruction.
//!
//! This crate reads the JSON metadata CMake writes under
//! `<buildRoot>/.cmake/api/v1` and rebuilds, per source file, the compiler
//! invocation CMake would use, without running the build. It understands the
//! `cache`, `codemodel`, and `toolchains` object kinds and degrades to a
//! cache-derived toolchain detection on CMake versions that predate the
//! toolchains reply.
//!
//! # Example
//!
//! ```no_run
//! use cmscan_api::{ApiSession, CommandOptions};
//! use std::path::Path;
//!
//! # fn main() -> cmscan_api::Result<()> {
//! let mut session = ApiSession::new();
//! session.load_api(Path::new("C:/proj/build"))?;
//!
//! for command in session.compile_commands(CommandOptions::default())? {
//!     let command = command?;
//!     println!("{} {}", command.compiler.path.display(), command.arguments);
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
mod codemodel;
mod command;
mod error;
mod query;
mod reply;
mod session;
mod toolchain;
mod version;

pub use cache::CacheModel;
pub use codemodel::{
    load_target, Codemodel, CompileGroup, Define, Fragment, IncludeDir, SourceEntry,
    TargetDocument, TargetRef,
};
pub use command::{
    escape_argument, join_arguments, synthesize_arguments, CommandOptions, CompileCommand,
};
pub use error::{ApiError, Result};
pub use query::write_query;
pub use reply::{read_reply_file, resolve_index, IndexFile, ReplyRef, CLIENT_NAME, INDEX_PREFIX};
pub use session::{ApiSession, CmakeConfigure, CompileCommandIter, ConfigureRunner};
pub use toolchain::{CompilerInfo, Language, ToolchainSource, Toolchains};
pub use version::{ToolVersion, MIN_CMAKE_VERSION, TOOLCHAINS_MAX_VERSION};
