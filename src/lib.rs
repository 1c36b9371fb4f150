pub mod component;
pub mod config;
pub mod init;
pub mod signal;
pub mod tools;

rust_i18n::i18n!("locales", fallback = "en-US");
