use crate::{EnrollmentSet, FlowVariant, Identifier, Step};

/// Read-only view of controller state for rendering.
#[derive(Debug, Clone, Copy)]
pub struct EnrollmentSnapshot<'a> {
    pub step: Step,
    pub selection: Option<&'a Identifier>,
    pub enrolled: &'a EnrollmentSet,
    pub identifiers: &'a [Identifier],
    pub variant: FlowVariant,
}

impl EnrollmentSnapshot<'_> {
    #[must_use]
    pub fn busy(&self) -> bool {
        self.step.is_busy()
    }

    /// Whether the selection UI should offer `id` at all.
    #[must_use]
    pub fn is_selectable(&self, id: &Identifier) -> bool {
        !self.enrolled.contains(id)
    }

    #[must_use]
    pub fn is_selected(&self, id: &Identifier) -> bool {
        self.selection == Some(id)
    }

    /// True once every configured identifier has been enrolled.
    #[must_use]
    pub fn all_enrolled(&self) -> bool {
        self.identifiers.iter().all(|id| self.enrolled.contains(id))
    }
}
