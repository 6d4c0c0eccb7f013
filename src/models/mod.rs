pub mod registration;
pub mod sport;
