pub mod colors;
pub mod hook;
pub mod log;
pub mod scroll;
pub mod task;
