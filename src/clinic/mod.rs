mod builder;
mod config;
mod core;

pub use self::{builder::Builder, core::Clinic};

use self::config::Config;
