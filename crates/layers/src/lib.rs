pub mod executor;
pub mod popup;
pub mod surface;
pub mod symbology;

pub use executor::*;
pub use popup::*;
pub use surface::*;
pub use symbology::*;
