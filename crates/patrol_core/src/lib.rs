pub mod backup;
pub mod core_api;
pub mod edits;
pub mod paths;
pub mod record;
pub mod store;
