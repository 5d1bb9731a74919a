pub mod exchange;
pub mod message;
pub mod reducer;
pub mod transport;

pub use exchange::*;
pub use message::*;
pub use reducer::*;
pub use transport::*;
