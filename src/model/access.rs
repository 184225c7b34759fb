//! Capability bits granted to a user, one bit per action.

pub type AccessMask = u64;

// Bit positions follow the legacy access mask layout shared with existing
// user records; the unused bits in between belong to other services.
pub const LOGIN: AccessMask = 0;
pub const DOC_READ: AccessMask = 1 << 10;
pub const DOC_OWNREAD: AccessMask = 1 << 11;
pub const DOC_CREATE: AccessMask = 1 << 12;
pub const DOC_UPDATE: AccessMask = 1 << 13;
pub const DOC_OWNUPDATE: AccessMask = 1 << 14;

/// Whether `granted` covers `required`. Document read/update also accept the
/// narrower "own documents" bits.
pub fn allows(granted: AccessMask, required: AccessMask) -> bool {
    if required == LOGIN || granted & required != 0 {
        return true;
    }
    match required {
        DOC_READ => granted & DOC_OWNREAD != 0,
        DOC_UPDATE => granted & DOC_OWNUPDATE != 0,
        _ => false,
    }
}
