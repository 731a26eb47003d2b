pub mod files;
pub mod output;
pub mod policies;
pub mod transcribe;

pub use files::*;
pub use output::*;
pub use policies::*;
pub use transcribe::*;
