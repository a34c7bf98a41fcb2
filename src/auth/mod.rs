pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod utils;

pub use claims::Claims;
pub use jwt::JwtVerifier;
pub use middleware::OptionalPrincipal;
pub use utils::{require_owner, require_principal, Principal};
