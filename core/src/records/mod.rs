pub mod audit;
pub mod model;
pub mod store;
