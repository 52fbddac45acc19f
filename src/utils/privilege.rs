use crate::error::{Result, RudixError};

/// Whether the process runs with administrator (root) privileges.
#[cfg(unix)]
pub fn is_administrator() -> bool {
    nix::unistd::Uid::effective().is_root()
}

#[cfg(not(unix))]
pub fn is_administrator() -> bool {
    false
}

/// Capability check performed before any command that changes installed packages.
pub fn require_administrator() -> Result<()> {
    if is_administrator() {
        Ok(())
    } else {
        Err(RudixError::PermissionDenied)
    }
}
