use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// How two images are presented against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ComparisonMode {
    #[default]
    None,
    SideBySide,
    Slider,
}

/// Which pair of images a comparison shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ComparisonTarget {
    /// The source against the most recently stored result
    #[default]
    SourceVsLatest,
    /// Encoder A's result against encoder B's
    ResultPair,
}

impl fmt::Display for ComparisonTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonTarget::SourceVsLatest => write!(f, "source vs latest result"),
            ComparisonTarget::ResultPair => write!(f, "result A vs result B"),
        }
    }
}

/// The single comparison currently selected for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ActiveComparison {
    pub mode: ComparisonMode,
    pub target: ComparisonTarget,
}

impl ActiveComparison {
    pub const NONE: ActiveComparison = ActiveComparison {
        mode: ComparisonMode::None,
        target: ComparisonTarget::SourceVsLatest,
    };

    pub fn is_none(&self) -> bool {
        self.mode == ComparisonMode::None
    }

    /// Both encoders' results are on screen against each other.
    pub fn is_dual_result(&self) -> bool {
        !self.is_none() && self.target == ComparisonTarget::ResultPair
    }
}

/// The two encoded images of a comparison, in before/after order.
#[derive(Debug, Clone)]
pub struct ComparisonImages {
    pub before: Arc<[u8]>,
    pub after: Arc<[u8]>,
    pub before_label: String,
    pub after_label: String,
}
