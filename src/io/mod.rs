//! Reading and writing delimited text files.

pub mod reader;
pub mod writer;

pub use reader::{load_csv, read_table, LoadOptions};
pub use writer::{write_csv, write_table, WriteOptions};
