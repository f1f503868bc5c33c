// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Opaque token for one registered callback. [`CallbackHandle::INVALID`] (`0`) is what
/// registration returns when it is refused. Valid handles are issued in increasing order
/// and never reused by the same registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CallbackHandle(pub(crate) u64);

impl CallbackHandle {
    pub const INVALID: Self = Self(0);

    #[must_use]
    pub fn is_valid(self) -> bool { self != Self::INVALID }

    #[must_use]
    pub fn as_u64(self) -> u64 { self.0 }

    /// The handle issued after this one.
    pub(crate) fn next(self) -> Self { Self(self.0.wrapping_add(1).max(1)) }
}

impl From<CallbackHandle> for u64 {
    fn from(handle: CallbackHandle) -> Self { handle.0 }
}

impl Display for CallbackHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult { write!(f, "#{}", self.0) }
}
