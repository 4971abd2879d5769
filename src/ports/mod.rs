//! Effectful sources used by procedures.
//!
//! Time and randomness are the only side effects of the hello router. Both
//! are injected as trait objects so tests can pin them down.

pub mod clock;
pub mod random;

pub use clock::{Clock, FixedClock, SystemClock};
pub use random::{FixedIndex, RandomSource, ThreadRandom};
