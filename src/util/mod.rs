// Utility Module
// File helpers shared by the library and the command line

pub mod file_ops;

pub use file_ops::{format_file_size, load_key, read_file, save_key, write_file, Progress};
