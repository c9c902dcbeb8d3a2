pub mod bundle;
pub mod config;
pub mod error;
pub mod types;
pub mod vfs;

pub use bundle::*;
pub use config::*;
pub use error::*;
pub use types::*;
pub use vfs::*;
