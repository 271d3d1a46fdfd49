pub mod definition;
pub mod executor;
pub mod search;
