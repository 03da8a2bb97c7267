pub mod accumulator;
pub mod aggregates;

pub use accumulator::SummaryStats;
pub use aggregates::{ScalarMoments, ThreadStats, TimelineMoments};
