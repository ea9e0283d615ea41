pub mod error;
pub mod fs;
pub mod hash;
pub mod time;
