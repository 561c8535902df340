pub mod registry;
pub mod traits;

mod http;

// Exchange-rate API implementations
pub mod exchangerate_host;
pub mod frankfurter;
pub mod open_er_api;

// Part-number mapping backend
pub mod mapping_store;
