pub mod access;
pub mod extractor;
pub mod jwt;
pub mod password;
pub mod session;

pub use access::*;
pub use extractor::*;
pub use jwt::*;
pub use password::*;
pub use session::*;
