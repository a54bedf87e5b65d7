//! JSON Web Token authentication.
//!
//! Every API route except the health check requires an `Authorization: Bearer <token>`
//! header. The `jti` claim of the token identifies the user whose data is accessed.

mod claims;
mod token_endpoint;

pub use claims::{AuthError, AuthState, Claims};
pub use token_endpoint::create_token_endpoint;
