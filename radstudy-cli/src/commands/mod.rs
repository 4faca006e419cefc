pub mod assign;
pub mod config;
pub mod genuid;
pub mod serve;
