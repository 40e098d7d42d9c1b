pub mod api;
pub mod capture;
pub mod records;
