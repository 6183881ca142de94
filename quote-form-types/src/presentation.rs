/// What the result area shows after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    /// `Total: <amount>` when a total was computed.
    pub total_line: Option<String>,

    /// Pretty-printed collected values.
    pub values_dump: String,
}

impl Presentation {
    /// The full result text: total line (if any) above the values dump.
    pub fn to_text(&self) -> String {
        match &self.total_line {
            Some(total) => format!("{total}\n{}", self.values_dump),
            None => self.values_dump.clone(),
        }
    }
}

/// The observable state of a form.
///
/// A form starts unsubmitted with its result area hidden. Every submit
/// re-enters `Submitted`, replacing the previous presentation; there is no way
/// back other than assembling the form again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Unsubmitted,
    Submitted(Presentation),
}

impl Phase {
    /// Whether the result area is visible.
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }

    /// The latest presentation, if the form was submitted.
    pub fn presentation(&self) -> Option<&Presentation> {
        match self {
            Self::Unsubmitted => None,
            Self::Submitted(p) => Some(p),
        }
    }
}
