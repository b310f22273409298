#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dxf;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
