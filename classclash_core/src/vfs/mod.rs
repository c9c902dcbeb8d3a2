pub mod local;
pub mod archive;

pub use local::LocalVfs;
pub use archive::ZipVfs;
