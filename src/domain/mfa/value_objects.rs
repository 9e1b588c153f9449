use serde::{Deserialize, Serialize};
use std::fmt;

/// Second factor kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MfaType {
    Totp,
    Sms,
    BackupCodes,
    Email,
    HardwareKey,
}

impl MfaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MfaType::Totp => "Totp",
            MfaType::Sms => "Sms",
            MfaType::BackupCodes => "BackupCodes",
            MfaType::Email => "Email",
            MfaType::HardwareKey => "HardwareKey",
        }
    }
}

impl fmt::Display for MfaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
