pub mod lines;
pub mod segment;
pub mod toc;

pub use segment::{has_toc_marker, segment, Segments};
pub use toc::{parse_toc, TocNode};
