//! Request identity and organization access control

pub mod context;
mod extract;
mod middleware;
mod policy;

pub use context::AuthContext;
pub use extract::RequireAuth;
pub use middleware::{identity_middleware, IdentityResolver, USER_EMAIL_HEADER, USER_ID_HEADER};
pub use policy::{access_policy_for, AccessError, AccessPolicy, MembershipPolicy, OpenAccessPolicy};
