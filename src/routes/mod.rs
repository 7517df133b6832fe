/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules,
/// enforcing a Defense-in-Depth strategy. Access control is applied explicitly
/// at the module level (via Axum layers and the Role Guard), preventing
/// accidental exposure of protected endpoints.
///
/// The four modules map directly to the defined access tiers.

/// Routes accessible to all clients (no token required).
/// Catalogue handlers enforce the approved-only filter at the Repository level.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a validated session token; role is not checked here.
pub mod authenticated;

/// Routes restricted to users whose *stored* role is 'admin'.
/// Each handler invokes the Role Guard before touching the store.
pub mod admin;

/// Routes restricted to users whose *stored* role is 'instructor'.
/// Same guard mechanism as the admin module, parametrized with the other role.
pub mod instructor;
