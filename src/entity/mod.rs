pub mod collection;
pub mod user;
