use std::fmt;

/// Numeric status returned by an engine call. Zero is success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineStatus(pub i32);

impl EngineStatus {
    pub const SUCCESS: Self = Self(0);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    pub fn code(self) -> i32 {
        self.0
    }

    /// `Ok(())` for success, otherwise the status as an error.
    pub fn into_result(self) -> crate::Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(crate::EngineError::Status(self))
        }
    }
}

impl From<i32> for EngineStatus {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
