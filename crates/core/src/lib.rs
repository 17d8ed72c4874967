pub mod correlate;
pub mod publish;
pub mod render;
pub mod source;
pub mod trace;

pub use trace::*;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
