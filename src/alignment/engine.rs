/*!
 * Banded global alignment of script lines against subtitle cues.
 *
 * Needleman–Wunsch minimizing cost instead of maximizing score, with
 * distinct gap costs for each side: script-only lines (narration, stage
 * directions that slipped through) are cheap, subtitle-only cues (ad-libs)
 * are expensive. Only cells within `|i*M/N - j| <= band_width` of the
 * diagonal are evaluated.
 */

use log::{debug, warn};

use crate::app_config::AlignmentConfig;
use crate::errors::AlignError;

use super::path::{AlignmentPath, AlignmentStep};
use super::scorer::SimilarityScorer;
use super::text_unit::{SubtitleCue, TextUnit};

/// Predecessor tag stored for every cell of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    Unreached,
    Origin,
    Match,
    ScriptGap,
    SubtitleGap,
}

/// Aligns two sequences under a fixed configuration
#[derive(Debug, Clone)]
pub struct AlignmentEngine {
    config: AlignmentConfig,
    scorer: SimilarityScorer,
}

impl AlignmentEngine {
    /// Create an engine, rejecting invalid weights or gap costs
    pub fn new(config: AlignmentConfig) -> Result<Self, AlignError> {
        config.validate()?;
        let scorer = config.scorer();
        Ok(Self { config, scorer })
    }

    /// Align the sequences, widening the band once if it turns out too narrow
    pub fn align(
        &self,
        script: &[TextUnit],
        subtitles: &[SubtitleCue],
    ) -> Result<AlignmentPath, AlignError> {
        validate_inputs(script, subtitles)?;

        if let Some(path) = self.trivial_path(script.len(), subtitles.len()) {
            return Ok(path);
        }

        let band_width = self
            .config
            .effective_band_width(script.len(), subtitles.len());

        match self.align_within_band(script, subtitles, band_width) {
            Err(AlignError::BandTooNarrow { .. }) => {
                let widened = (band_width * 2).max(1);
                warn!(
                    "Band width {} could not connect the alignment, retrying with {}",
                    band_width, widened
                );
                self.align_within_band(script, subtitles, widened)
            }
            other => other,
        }
    }

    /// Single banded attempt; fails with `BandTooNarrow` instead of retrying
    pub fn align_within_band(
        &self,
        script: &[TextUnit],
        subtitles: &[SubtitleCue],
        band_width: usize,
    ) -> Result<AlignmentPath, AlignError> {
        validate_inputs(script, subtitles)?;

        if let Some(path) = self.trivial_path(script.len(), subtitles.len()) {
            return Ok(path);
        }

        let n = script.len();
        let m = subtitles.len();
        let cols = m + 1;
        let gap_script = self.config.gap_script_cost;
        let gap_subtitle = self.config.gap_subtitle_cost;

        debug!(
            "Aligning {} script lines against {} cues (band width {})",
            n, m, band_width
        );

        let mut moves = vec![Move::Unreached; (n + 1) * cols];
        let mut prev_row = vec![f64::INFINITY; cols];
        let mut curr_row = vec![f64::INFINITY; cols];

        for i in 0..=n {
            curr_row.fill(f64::INFINITY);
            let (j_lo, j_hi) = band_columns(i, n, m, band_width);

            for j in j_lo..=j_hi {
                let (cost, step) = if i == 0 && j == 0 {
                    (0.0, Move::Origin)
                } else if j == 0 {
                    (i as f64 * gap_script, Move::ScriptGap)
                } else if i == 0 {
                    (j as f64 * gap_subtitle, Move::SubtitleGap)
                } else {
                    let via_script_gap = prev_row[j] + gap_script;
                    let via_subtitle_gap = curr_row[j - 1] + gap_subtitle;
                    // Scoring is the expensive part, skip it when the diagonal is unreachable
                    let via_match = if prev_row[j - 1].is_finite() {
                        prev_row[j - 1] + self.scorer.cost(&script[i - 1], &subtitles[j - 1].unit)
                    } else {
                        f64::INFINITY
                    };

                    // Ties prefer match, then script gap, then subtitle gap
                    let mut best = (via_match, Move::Match);
                    if via_script_gap < best.0 {
                        best = (via_script_gap, Move::ScriptGap);
                    }
                    if via_subtitle_gap < best.0 {
                        best = (via_subtitle_gap, Move::SubtitleGap);
                    }
                    if best.0.is_finite() {
                        best
                    } else {
                        (f64::INFINITY, Move::Unreached)
                    }
                };

                curr_row[j] = cost;
                moves[i * cols + j] = step;
            }

            std::mem::swap(&mut prev_row, &mut curr_row);
        }

        let total_cost = prev_row[m];
        if !total_cost.is_finite() {
            return Err(AlignError::BandTooNarrow { band_width });
        }

        let steps = self.backtrack(&moves, cols, script, subtitles, band_width)?;
        Ok(AlignmentPath::new(steps, total_cost))
    }

    fn backtrack(
        &self,
        moves: &[Move],
        cols: usize,
        script: &[TextUnit],
        subtitles: &[SubtitleCue],
        band_width: usize,
    ) -> Result<Vec<AlignmentStep>, AlignError> {
        let mut steps = Vec::with_capacity(script.len() + subtitles.len());
        let mut i = script.len();
        let mut j = subtitles.len();

        while i > 0 || j > 0 {
            match moves[i * cols + j] {
                Move::Match => {
                    i -= 1;
                    j -= 1;
                    steps.push(AlignmentStep::Match {
                        script_idx: i,
                        subtitle_idx: j,
                        cost: self.scorer.cost(&script[i], &subtitles[j].unit),
                    });
                }
                Move::ScriptGap => {
                    i -= 1;
                    steps.push(AlignmentStep::ScriptGap { script_idx: i });
                }
                Move::SubtitleGap => {
                    j -= 1;
                    steps.push(AlignmentStep::SubtitleGap { subtitle_idx: j });
                }
                Move::Unreached | Move::Origin => {
                    return Err(AlignError::BandTooNarrow { band_width });
                }
            }
        }

        steps.reverse();
        Ok(steps)
    }

    fn trivial_path(&self, script_len: usize, subtitle_len: usize) -> Option<AlignmentPath> {
        if script_len == 0 {
            return Some(AlignmentPath::subtitle_gaps(
                subtitle_len,
                self.config.gap_subtitle_cost,
            ));
        }
        if subtitle_len == 0 {
            return Some(AlignmentPath::script_gaps(
                script_len,
                self.config.gap_script_cost,
            ));
        }
        None
    }
}

/// Inclusive column range of row `i` inside the band `|i*m - j*n| <= w*n`
fn band_columns(i: usize, n: usize, m: usize, band_width: usize) -> (usize, usize) {
    let center = i * m;
    let reach = band_width.saturating_mul(n);
    let lo = center.saturating_sub(reach).div_ceil(n);
    let hi = (center.saturating_add(reach) / n).min(m);
    (lo, hi)
}

/// Reject malformed sequences before any computation
pub fn validate_inputs(script: &[TextUnit], subtitles: &[SubtitleCue]) -> Result<(), AlignError> {
    let mut previous_start = 0;
    for (idx, cue) in subtitles.iter().enumerate() {
        if cue.start_ms > cue.end_ms {
            return Err(AlignError::invalid_input(format!(
                "subtitle cue {} ends at {} ms before it starts at {} ms",
                idx, cue.end_ms, cue.start_ms
            )));
        }
        if cue.start_ms < previous_start {
            return Err(AlignError::invalid_input(format!(
                "subtitle cue {} starts at {} ms, before the previous cue at {} ms",
                idx, cue.start_ms, previous_start
            )));
        }
        previous_start = cue.start_ms;
    }

    let embeddings = script
        .iter()
        .chain(subtitles.iter().map(|cue| &cue.unit))
        .filter_map(|unit| unit.embedding.as_ref().map(|e| (unit, e.len())));

    let mut dimension: Option<usize> = None;
    for (unit, len) in embeddings {
        if len == 0 {
            return Err(AlignError::invalid_input(format!(
                "text unit {} has an empty embedding",
                unit.id
            )));
        }
        match dimension {
            None => dimension = Some(len),
            Some(expected) if expected != len => {
                return Err(AlignError::invalid_input(format!(
                    "text unit {} has a {}-dimensional embedding, expected {}",
                    unit.id, len, expected
                )));
            }
            Some(_) => {}
        }
    }

    Ok(())
}
