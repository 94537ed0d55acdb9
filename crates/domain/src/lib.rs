//! Domain records and invariants for the administration console.

#![forbid(unsafe_code)]

mod association;
mod directory;
mod grant;
mod record;
mod security;
mod user;

pub use association::{AccessFlag, CustomerUserLink, EmployeeUserLink, LinkRecord};
pub use directory::{Customer, Employee, UserAccount};
pub use grant::{Grant, GrantSet};
pub use record::{DRAFT_RECORD_ID, RecordId, TableRecord, require_field, wire_id_value};
pub use security::{
    PermissionDescriptor, RBAC_DATA_OBJECT, READ_ACTION, RoleDefinition, RolePermissionMatrix,
    SubjectRoleAssignment, WRITE_ACTION,
};
pub use user::{ACCOUNT_PASSWORD_MIN_LENGTH, EmailAddress, validate_account_password};
