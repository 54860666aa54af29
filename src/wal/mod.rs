pub mod log_format;
pub mod reader;
pub mod record;
pub mod writer;

pub use log_format::HEADER_SIZE;
pub use reader::Reader;
pub use record::LogRecord;
pub use writer::Writer;
