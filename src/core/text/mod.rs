pub mod ansi;
pub mod utils;
pub mod width;
