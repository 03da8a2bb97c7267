pub mod path_writer;
pub mod summary;

pub use path_writer::FrameShape;
pub use summary::{RunSummary, TimelineSummary};
