pub mod container;
pub mod session;
pub mod user;
