//! Prompt kinds and their instruction text

use serde::{Deserialize, Serialize};

/// What the AI should do with the submitted image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PromptKind {
    /// Solve the handwritten or drawn problem
    #[default]
    Solve,
    /// Explain the drawing or problem
    Explain,
    /// Grade the work and give feedback
    Grade,
}

impl PromptKind {
    pub const ALL: [PromptKind; 3] = [PromptKind::Solve, PromptKind::Explain, PromptKind::Grade];

    /// Instruction text sent alongside the image
    pub fn instruction(&self) -> &'static str {
        match self {
            PromptKind::Solve => "Solve this handwritten or drawn math problem:",
            PromptKind::Explain => "Explain this drawing or problem:",
            PromptKind::Grade => "Grade this and give feedback:",
        }
    }

    /// Short label for the prompt selector and history entries
    pub fn label(&self) -> &'static str {
        match self {
            PromptKind::Solve => "Solve this",
            PromptKind::Explain => "Explain this",
            PromptKind::Grade => "Grade this",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_instruction_and_label() {
        for kind in PromptKind::ALL {
            assert!(kind.instruction().ends_with(':'));
            assert!(!kind.label().is_empty());
        }
    }
}
