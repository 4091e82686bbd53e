// kpathsea-core/src/lib.rs

#![doc = include_str!("../../README.md")]

pub mod config;
pub mod errors;
pub mod format;
pub mod locate;
pub mod lookup;
pub mod runner;


pub use config::KpathseaConfig;
pub use errors::LookupError;
pub use format::FileFormat;
pub use locate::{ExecutableBinding, ExecutableProbe, FsProbe, KPSEWHICH};
pub use lookup::{Kpathsea, build_args, map_output};
pub use runner::{CommandOutput, ProcessRunner, SystemRunner};

pub use async_trait::async_trait;
