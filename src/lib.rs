pub mod answers;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod output;
pub mod rubric;
pub mod scoring;
pub mod session;
pub mod source;
pub mod stderr_buffer;
pub mod table;
pub mod tui;
