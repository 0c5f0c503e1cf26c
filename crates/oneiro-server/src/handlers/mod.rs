pub mod credits;
pub mod dreams;
pub mod health;
pub mod interpret;
