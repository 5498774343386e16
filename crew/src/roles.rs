//! The agent roles a crew is made of.

use std::fmt;

/// One member of a crew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    /// Gathers information and evidence.
    Researcher,
    /// Scores the veracity of a claim.
    FactChecker,
    /// Drafts content from research.
    Writer,
    /// Polishes a draft without losing accuracy.
    Editor,
}

impl AgentRole {
    /// Role title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Researcher => "Researcher",
            Self::FactChecker => "Fact Checker",
            Self::Writer => "Content Writer",
            Self::Editor => "Editor",
        }
    }

    /// What the role is trying to achieve.
    #[must_use]
    pub const fn goal(self) -> &'static str {
        match self {
            Self::Researcher => "Gather comprehensive information on the given topic",
            Self::FactChecker => {
                "Verify the accuracy of information and provide a veracity score"
            }
            Self::Writer => "Create engaging and factual content",
            Self::Editor => "Refine and polish content while maintaining accuracy",
        }
    }

    /// Persona text.
    #[must_use]
    pub const fn backstory(self) -> &'static str {
        match self {
            Self::Researcher => "Expert researcher with vast knowledge in multiple domains",
            Self::FactChecker => "Experienced fact checker with attention to detail",
            Self::Writer => "Professional writer specializing in accurate content creation",
            Self::Editor => "Senior editor with years of experience in content optimization",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
