//! Configuration loading for fieldguard
//!
//! Reads rule tables from JSON or TOML files and settings from prefixed
//! environment variables (optionally seeded from a `.env` file).
//!
//! ```
//! use fieldguard_config::{ConfigLoader, FileFormat};
//!
//! let loader = ConfigLoader::new(FileFormat::Toml);
//! let value = loader
//!     .parse(r#"
//!         [["/orders"]]
//!         field = "amount"
//!         min = 0
//!     "#)
//!     .unwrap();
//!
//! assert_eq!(value["/orders"][0]["field"], "amount");
//! ```

pub mod env;
pub mod error;
pub mod loader;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
