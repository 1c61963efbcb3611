pub mod catalog;
pub mod config;
pub mod debounce;
pub mod descriptor;
pub mod dispatch;
pub mod doctor;
pub mod episodes;
pub mod fetch;
pub mod session;
pub mod streams;
pub mod tui;
