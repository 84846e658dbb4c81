/// Router Module Index
///
/// Routes are split by access level; authentication is applied per module as a route
/// layer in `create_router`, so a handler can never be exposed without it by accident.

/// Routes reachable without a token (health check).
pub mod public;

/// Routes behind the `AuthUser` middleware: every service endpoint.
pub mod authenticated;
