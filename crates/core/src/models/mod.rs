pub mod config;
pub mod currency;
pub mod history;
pub mod mapping;
pub mod pricing;
pub mod rate;
pub mod settings;
