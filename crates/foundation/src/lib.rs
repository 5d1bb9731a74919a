pub mod bounds;
pub mod lnglat;
pub mod math;
pub mod ring;

// Foundation crate: small, well-tested geographic primitives only.
pub use bounds::*;
pub use lnglat::*;
pub use ring::*;
