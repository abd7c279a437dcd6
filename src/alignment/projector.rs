/*!
 * Projection of subtitle timing onto script lines along an alignment path.
 */

use serde::{Deserialize, Serialize};

use crate::errors::AlignError;

use super::path::{AlignmentPath, AlignmentStep};
use super::text_unit::{SubtitleCue, TextUnit};

/// How a script line obtained its timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Copied from the matched cue
    Exact,
    /// Interpolated between the nearest matched lines
    Interpolated,
    /// No anchor on one side, no timing
    Unresolved,
}

/// A script line with its estimated timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedScriptLine {
    pub script_idx: usize,
    pub raw_text: String,
    pub start_ms: Option<u64>,
    pub end_ms: Option<u64>,
    pub resolution: Resolution,
}

/// Assign a start/end time to every script line, in script order
pub fn project(
    path: &AlignmentPath,
    script: &[TextUnit],
    subtitles: &[SubtitleCue],
) -> Result<Vec<TimedScriptLine>, AlignError> {
    path.validate(script.len(), subtitles.len())?;

    // Matched cue per script line; `None` for script-only lines
    let mut anchors: Vec<Option<&SubtitleCue>> = vec![None; script.len()];
    for step in path {
        if let AlignmentStep::Match {
            script_idx,
            subtitle_idx,
            ..
        } = *step
        {
            anchors[script_idx] = Some(&subtitles[subtitle_idx]);
        }
    }

    let mut lines: Vec<TimedScriptLine> = script
        .iter()
        .enumerate()
        .map(|(idx, unit)| match anchors[idx] {
            Some(cue) => TimedScriptLine {
                script_idx: idx,
                raw_text: unit.raw_text.clone(),
                start_ms: Some(cue.start_ms),
                end_ms: Some(cue.end_ms),
                resolution: Resolution::Exact,
            },
            None => TimedScriptLine {
                script_idx: idx,
                raw_text: unit.raw_text.clone(),
                start_ms: None,
                end_ms: None,
                resolution: Resolution::Unresolved,
            },
        })
        .collect();

    interpolate_gap_runs(&mut lines);

    Ok(lines)
}

/// Fill every run of unresolved lines that has an exact line on both sides
fn interpolate_gap_runs(lines: &mut [TimedScriptLine]) {
    let mut previous_exact: Option<usize> = None;
    let mut idx = 0;

    while idx < lines.len() {
        if lines[idx].resolution == Resolution::Exact {
            previous_exact = Some(idx);
            idx += 1;
            continue;
        }

        let run_start = idx;
        while idx < lines.len() && lines[idx].resolution != Resolution::Exact {
            idx += 1;
        }

        // Runs touching either end of the script stay unresolved
        let (Some(before), true) = (previous_exact, idx < lines.len()) else {
            continue;
        };

        let (Some(window_start), Some(window_end)) = (lines[before].end_ms, lines[idx].start_ms)
        else {
            continue;
        };

        let run = &mut lines[run_start..idx];
        let count = run.len() as u64;
        let span = window_end.saturating_sub(window_start);
        for (position, line) in run.iter_mut().enumerate() {
            let position = position as u64;
            line.start_ms = Some(window_start + split_point(span, position, count));
            line.end_ms = Some(window_start + split_point(span, position + 1, count));
            line.resolution = Resolution::Interpolated;
        }
    }
}

/// `span * part / whole`, rounded to the nearest millisecond
fn split_point(span: u64, part: u64, whole: u64) -> u64 {
    ((span as u128 * part as u128 * 2 + whole as u128) / (whole as u128 * 2)) as u64
}
