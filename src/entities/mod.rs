pub mod account;
pub mod account_group;
pub mod group;
pub mod post;
pub mod post_tag;
pub mod tag;
pub mod user;
