pub mod writer;

pub use writer::{ordered_rows, write_csv, write_to, WriterError};
