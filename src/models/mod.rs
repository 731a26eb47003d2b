pub mod analysis;
pub mod deepgram;
pub mod risk;
pub mod tenant;

pub use analysis::*;
pub use deepgram::*;
pub use risk::*;
pub use tenant::*;
