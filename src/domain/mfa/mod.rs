// ============================================================================
// MFA Domain - Second-Factor Methods
// ============================================================================
//
// - MfaType and the MfaMethod aggregate (setup, enable/disable, lockout)
// - Events; secret material never leaves the process in them
// - Specifications and the command handler
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod aggregate;
pub mod specifications;
pub mod command_handler;

pub use value_objects::MfaType;
pub use events::*;
pub use commands::{CreateMfaMethod, MfaCommand};
pub use aggregate::{MfaMethod, DEFAULT_BACKUP_CODES, LOCKOUT_MINUTES, MAX_FAILED_ATTEMPTS};
pub use specifications::MfaMethodSpecifications;
pub use command_handler::MfaCommandHandler;
