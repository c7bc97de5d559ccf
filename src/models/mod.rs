pub mod group;
pub mod post;
pub mod user;

pub use group::*;
pub use post::*;
pub use user::*;
