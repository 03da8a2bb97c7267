pub mod stream;

pub use stream::{SimRng, DEFAULT_SEED};
