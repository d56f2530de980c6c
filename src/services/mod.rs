// Service layer over the repositories

pub mod autocomplete;
pub mod search;
pub mod tagging;
