use crate::Identifier;

/// A user intent forwarded by the host surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Choose(Identifier),
    Advance,
    Cancel,
    Retry,
    Restart,
    Finish,
}

impl Intent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Intent::Choose(_) => "choose",
            Intent::Advance => "advance",
            Intent::Cancel => "cancel",
            Intent::Retry => "retry",
            Intent::Restart => "restart",
            Intent::Finish => "finish",
        }
    }
}
