pub mod discovery;
pub mod reader;
pub mod timestamp;

pub use discovery::{discover_sources, SourceFile, SourceNamePattern};
pub use reader::BatchReader;
