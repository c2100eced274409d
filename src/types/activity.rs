use serde::{Deserialize, Serialize};

/// Closed set of schedulable study activities.
///
/// Theory activities are attributed to a curriculum unit; cases and
/// programming draw from the global ledgers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activity {
    StudyTheme,
    Review,
    Podcast,
    Flashcard,
    Quiz,
    CasePractice,
    CaseMock,
    ProgrammingBlock,
}

/// Top-level allocation buckets with a 50/30/20 target split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Theory,
    Cases,
    Programming,
}

/// SELVIA learning phases used to tag blocks for presentation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    #[serde(rename = "P1_CONTEXT")]
    P1Context,
    #[serde(rename = "P2_DEPTH")]
    P2Depth,
    #[serde(rename = "P3_EVAL_REVIEW")]
    P3EvalReview,
    #[serde(rename = "P4_PRACTICE")]
    P4Practice,
}

/// Presentation type of a block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    NewContent,
    Review,
    Recap,
    Quiz,
    Practice,
    Evaluation,
}

/// Presentation format of a block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockFormat {
    RawContent,
    Flashcards,
    Audio,
    Quiz,
}

impl Activity {
    pub fn all() -> Vec<Self> {
        vec![
            Self::StudyTheme,
            Self::Review,
            Self::Podcast,
            Self::Flashcard,
            Self::Quiz,
            Self::CasePractice,
            Self::CaseMock,
            Self::ProgrammingBlock,
        ]
    }

    /// Wire tag, also used in deterministic block ids.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::StudyTheme => "STUDY_THEME",
            Self::Review => "REVIEW",
            Self::Podcast => "PODCAST",
            Self::Flashcard => "FLASHCARD",
            Self::Quiz => "QUIZ",
            Self::CasePractice => "CASE_PRACTICE",
            Self::CaseMock => "CASE_MOCK",
            Self::ProgrammingBlock => "PROGRAMMING_BLOCK",
        }
    }

    pub fn stream(&self) -> Stream {
        match self {
            Self::StudyTheme | Self::Review | Self::Podcast | Self::Flashcard | Self::Quiz => {
                Stream::Theory
            },
            Self::CasePractice | Self::CaseMock => Stream::Cases,
            Self::ProgrammingBlock => Stream::Programming,
        }
    }

    pub fn is_theory(&self) -> bool {
        self.stream() == Stream::Theory
    }

    /// Theory activities other than STUDY_THEME.
    pub fn is_secondary(&self) -> bool {
        self.is_theory() && *self != Self::StudyTheme
    }

    pub fn phase(&self) -> Phase {
        match self {
            Self::StudyTheme | Self::Podcast => Phase::P2Depth,
            Self::Review | Self::Flashcard | Self::Quiz => Phase::P3EvalReview,
            Self::CasePractice | Self::CaseMock | Self::ProgrammingBlock => Phase::P4Practice,
        }
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            Self::StudyTheme | Self::Podcast => BlockType::NewContent,
            Self::Review => BlockType::Review,
            Self::Flashcard => BlockType::Recap,
            Self::Quiz => BlockType::Quiz,
            Self::CasePractice | Self::ProgrammingBlock => BlockType::Practice,
            Self::CaseMock => BlockType::Evaluation,
        }
    }

    pub fn format(&self) -> BlockFormat {
        match self {
            Self::StudyTheme | Self::ProgrammingBlock => BlockFormat::RawContent,
            Self::Review | Self::Flashcard => BlockFormat::Flashcards,
            Self::Podcast => BlockFormat::Audio,
            Self::Quiz | Self::CasePractice | Self::CaseMock => BlockFormat::Quiz,
        }
    }
}

impl Stream {
    pub fn all() -> Vec<Self> {
        vec![Self::Theory, Self::Cases, Self::Programming]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Theory => "Teoría",
            Self::Cases => "Casos prácticos",
            Self::Programming => "Programación didáctica",
        }
    }
}

impl Phase {
    pub fn all() -> Vec<Self> {
        vec![Self::P1Context, Self::P2Depth, Self::P3EvalReview, Self::P4Practice]
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::P1Context => "P1_CONTEXT",
            Self::P2Depth => "P2_DEPTH",
            Self::P3EvalReview => "P3_EVAL_REVIEW",
            Self::P4Practice => "P4_PRACTICE",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::P1Context => "Contexto",
            Self::P2Depth => "Profundización",
            Self::P3EvalReview => "Evaluación y repaso",
            Self::P4Practice => "Práctica aplicada",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::P1Context => "Visión general del temario y organización del estudio",
            Self::P2Depth => "Estudio en profundidad de cada unidad",
            Self::P3EvalReview => "Repaso activo, flashcards y tests de unidad",
            Self::P4Practice => "Casos prácticos, simulacros y programación didáctica",
        }
    }
}
