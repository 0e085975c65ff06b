mod batch;
mod range;
mod record;
mod schema;

pub use batch::Batch;
pub use range::DateRange;
pub use record::Record;
pub use schema::FieldSchema;
