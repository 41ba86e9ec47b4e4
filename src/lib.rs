pub mod error;
pub mod iloc;
pub mod parser;
pub mod rename;
pub mod scheduling;
pub mod utils;
