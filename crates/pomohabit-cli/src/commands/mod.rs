pub mod config;
pub mod dashboard;
pub mod habit;
pub mod note;
pub mod timer;
