//! Authentication: password hashing, the session authority and the gate.

pub mod gate;
pub mod password;
pub mod session;

pub use gate::{require_auth, AuthUser};
pub use session::{Claims, LoginOutcome, SessionAuthority};
