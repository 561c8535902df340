pub mod comparison_service;
pub mod conversion_service;
pub mod history_service;
pub mod mapping_service;
pub mod part_number_service;
pub mod pattern_matcher;
pub mod rate_service;
