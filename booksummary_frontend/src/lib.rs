pub mod store;
pub mod summary_api;
pub mod view;
