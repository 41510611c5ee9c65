pub mod config;
pub mod nav;
pub mod text;
pub mod vault;
