/// Router Module Index
///
/// Routes are grouped by who may call them. The grouping decides which layers wrap a
/// route; handlers still perform their own role checks.

/// Routes open to anonymous callers: registration and login.
pub mod public;

/// Routes that need a valid session, any role.
pub mod authenticated;

/// Routes restricted to the 'admin' role.
pub mod admin;
