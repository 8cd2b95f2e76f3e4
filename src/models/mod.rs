pub mod movie;
pub mod rating;
pub mod user;

pub use movie::{Movie, NewMovie};
pub use rating::Rating;
pub use user::User;
