pub mod analyze;
pub mod normalize;
pub mod risk;

pub use analyze::*;
pub use normalize::*;
pub use risk::*;
