pub mod asset_store;
pub mod config;
pub mod table_file;
