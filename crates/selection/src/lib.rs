pub mod area;
pub mod context;
pub mod current;
pub mod geocoding;
pub mod pipeline;

pub use area::*;
pub use context::*;
pub use current::*;
pub use geocoding::*;
pub use pipeline::*;
