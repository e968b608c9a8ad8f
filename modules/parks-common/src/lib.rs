pub mod config;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod slug;
pub mod types;

pub use config::{Admin, Config, SmtpConfig};
pub use error::{FilterError, ParksError};
pub use filter::ParkFilter;
pub use slug::slugify;
pub use types::*;
