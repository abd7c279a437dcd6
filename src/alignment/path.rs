/*!
 * Alignment steps and the path they form.
 */

use serde::{Deserialize, Serialize};

use crate::errors::AlignError;

/// One decision of the alignment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlignmentStep {
    /// Script line paired with a subtitle cue
    Match {
        script_idx: usize,
        subtitle_idx: usize,
        cost: f64,
    },

    /// Script line with no subtitle counterpart
    ScriptGap { script_idx: usize },

    /// Subtitle cue with no script counterpart
    SubtitleGap { subtitle_idx: usize },
}

impl AlignmentStep {
    pub fn script_idx(&self) -> Option<usize> {
        match self {
            Self::Match { script_idx, .. } | Self::ScriptGap { script_idx } => Some(*script_idx),
            Self::SubtitleGap { .. } => None,
        }
    }

    pub fn subtitle_idx(&self) -> Option<usize> {
        match self {
            Self::Match { subtitle_idx, .. } | Self::SubtitleGap { subtitle_idx } => {
                Some(*subtitle_idx)
            }
            Self::ScriptGap { .. } => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }
}

/// Ordered, monotonic sequence of steps covering both inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentPath {
    steps: Vec<AlignmentStep>,

    /// Cost of the whole path, gaps included
    total_cost: f64,
}

impl AlignmentPath {
    pub fn new(steps: Vec<AlignmentStep>, total_cost: f64) -> Self {
        Self { steps, total_cost }
    }

    /// Path made only of script gaps
    pub fn script_gaps(count: usize, gap_cost: f64) -> Self {
        let steps = (0..count)
            .map(|script_idx| AlignmentStep::ScriptGap { script_idx })
            .collect();
        Self::new(steps, count as f64 * gap_cost)
    }

    /// Path made only of subtitle gaps
    pub fn subtitle_gaps(count: usize, gap_cost: f64) -> Self {
        let steps = (0..count)
            .map(|subtitle_idx| AlignmentStep::SubtitleGap { subtitle_idx })
            .collect();
        Self::new(steps, count as f64 * gap_cost)
    }

    pub fn steps(&self) -> &[AlignmentStep] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AlignmentStep> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn match_count(&self) -> usize {
        self.steps.iter().filter(|step| step.is_match()).count()
    }

    pub fn script_gap_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step, AlignmentStep::ScriptGap { .. }))
            .count()
    }

    pub fn subtitle_gap_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step, AlignmentStep::SubtitleGap { .. }))
            .count()
    }

    /// Check that the path visits every script and subtitle index exactly once, in order
    pub fn validate(&self, script_len: usize, subtitle_len: usize) -> Result<(), AlignError> {
        let mut next_script = 0;
        let mut next_subtitle = 0;

        for (position, step) in self.steps.iter().enumerate() {
            if let Some(idx) = step.script_idx() {
                if idx != next_script {
                    return Err(AlignError::invalid_input(format!(
                        "step {} visits script line {} but {} was expected",
                        position, idx, next_script
                    )));
                }
                next_script += 1;
            }
            if let Some(idx) = step.subtitle_idx() {
                if idx != next_subtitle {
                    return Err(AlignError::invalid_input(format!(
                        "step {} visits subtitle cue {} but {} was expected",
                        position, idx, next_subtitle
                    )));
                }
                next_subtitle += 1;
            }
        }

        if next_script != script_len || next_subtitle != subtitle_len {
            return Err(AlignError::invalid_input(format!(
                "path covers {}/{} script lines and {}/{} subtitle cues",
                next_script, script_len, next_subtitle, subtitle_len
            )));
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a AlignmentPath {
    type Item = &'a AlignmentStep;
    type IntoIter = std::slice::Iter<'a, AlignmentStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
