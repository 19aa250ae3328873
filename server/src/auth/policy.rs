//! Role sets accepted by each class of operation.

use shared::types::Role;

/// Content mutation. Declared for the content endpoints served behind the
/// gateway; no route in this crate mutates content.
pub const CONTENT_EDITORS: &[Role] = &[Role::Superadmin, Role::Editor];

/// User management.
pub const USER_ADMINS: &[Role] = &[Role::Superadmin];

/// Dashboard and reporting.
pub const DASHBOARD_VIEWERS: &[Role] = &[Role::Superadmin, Role::Editor, Role::Analyst];
