//! Byte source implementations

pub mod reader;
pub mod serial;

pub use reader::ReaderSource;
pub use serial::SerialSource;
