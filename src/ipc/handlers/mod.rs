pub mod core;
pub mod courses;
pub mod registrations;
pub mod results;
pub mod tables;
