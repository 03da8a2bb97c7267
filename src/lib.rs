/// ==============================================================================================
/// ======================== Branching-Process Outbreak Monte Carlo ==============================
/// ==============================================================================================
///
/// Monte Carlo engine for stochastic branching-process simulations of
/// outbreaks: each path grows a random infection tree rooted at `nstart`
/// primaries, accumulating per-bin timelines that are merged over worker
/// threads into extinction-conditional aggregates and serialised as
/// little-endian binary frames.

pub mod config;
pub mod driver;
pub mod output;
pub mod params;
pub mod rng;
pub mod sim;
pub mod stats;
pub mod trace;

#[cfg(test)]
mod tests;
