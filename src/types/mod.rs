pub mod config;
pub mod rating;
pub mod record;
pub mod result;
pub mod rules;
pub mod taxonomy;
pub mod version;
pub mod weights;
