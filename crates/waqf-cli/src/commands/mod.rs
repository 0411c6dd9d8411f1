pub mod audit;
pub mod check;
pub mod config;
pub mod export;
pub mod init;
pub mod invalidate;
pub mod key;
pub mod role;
pub mod roles;
pub mod user;
