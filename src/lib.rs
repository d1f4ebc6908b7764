pub mod capture;
pub mod config;
pub mod event;
pub mod http;
pub mod notice;
pub mod recovery;
pub mod session;
pub mod ui;
pub mod util;
pub mod validate;
