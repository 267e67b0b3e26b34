//! CLI commands implementation

pub mod init;
pub mod keygen;
pub mod records;
pub mod serve;
pub mod status;
pub mod train;

pub use init::*;
pub use keygen::*;
pub use records::*;
pub use serve::*;
pub use status::*;
pub use train::*;
