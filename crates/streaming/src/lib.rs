pub mod decoder;
pub mod protocol;

pub use decoder::*;
pub use protocol::*;
