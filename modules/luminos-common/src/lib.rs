pub mod config;
pub mod error;
pub mod geo;
pub mod text;
pub mod types;

pub use config::Config;
pub use error::LuminosError;
pub use geo::*;
pub use text::*;
pub use types::*;
