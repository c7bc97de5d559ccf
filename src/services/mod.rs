pub mod account;
pub mod group;
pub mod post;
pub mod slug;
