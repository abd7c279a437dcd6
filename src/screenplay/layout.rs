/*!
 * Layout analysis of plain-text screenplays.
 *
 * Screenplays encode structure through indentation: scene headings and
 * action are flush left, character cues and dialogue are indented towards
 * the center, transitions hug the right margin. This module filters page
 * furniture, splits the text into blank-line separated blocks and decides
 * the alignment of every block.
 */

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::ScriptParserConfig;

static SCENE_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]?\d+(pt)?\s").unwrap());
static CONTINUED_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^CONTINUED: \(\d+\)").unwrap());
static REVISION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Revision\s+\d+.").unwrap());
static COLUMN_GAP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

const DEFAULT_LTOL: usize = 8;

/// Horizontal placement of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAlignment {
    Left,
    Right,
    Center,
    /// One column of side-by-side dialogue
    DualCenter,
}

/// A blank-line separated group of lines, stripped, with its alignment
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub lines: Vec<String>,
    pub alignment: BlockAlignment,
}

/// Page-wide measurements the classification is relative to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub width: usize,
    pub indent: usize,
}

/// Drop page furniture and blank out leading scene numbers
pub fn filter_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let mut line = line.replace('\t', "    ");

            if let Some(found) = SCENE_NUMBER_REGEX.find(&line) {
                let width = found.as_str().chars().count();
                line.replace_range(found.range(), &" ".repeat(width));
            }

            let trimmed = line.trim();
            if matches!(
                trimmed.to_uppercase().as_str(),
                "(MORE)" | "(CONT'D)" | "(CONTINUED)"
            ) || CONTINUED_REGEX.is_match(trimmed)
                || REVISION_REGEX.is_match(trimmed)
            {
                return None;
            }

            Some(line)
        })
        .collect()
}

/// Widest line and smallest indentation over the non-blank lines
pub fn measure(lines: &[String]) -> PageMetrics {
    let width = lines.iter().map(|line| char_len(line)).max().unwrap_or(0);
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_whitespace(line))
        .min()
        .unwrap_or(0);

    PageMetrics { width, indent }
}

/// Split filtered lines into blocks and classify each one
pub fn extract_blocks(lines: &[String], config: &ScriptParserConfig) -> Vec<Block> {
    let raw_blocks = split_blocks(lines);
    let metrics = measure(lines);

    let ltol = match config.ltol {
        Some(ltol) => ltol,
        None => detect_left_tolerance(&raw_blocks, config.auto_tolerance),
    };
    let rtol = config.rtol;
    debug!(
        "Page width {}, indent {}, ltol {}, rtol {}",
        metrics.width, metrics.indent, ltol, rtol
    );

    let mut blocks = Vec::new();
    for raw in raw_blocks {
        if let Some(alignment) = classify_block(&raw, metrics, ltol, rtol) {
            blocks.push(Block {
                lines: raw.iter().map(|line| line.trim().to_string()).collect(),
                alignment,
            });
            continue;
        }

        match split_dual_columns(&raw) {
            Some(columns) => blocks.extend(columns.into_iter().map(|lines| Block {
                lines,
                alignment: BlockAlignment::DualCenter,
            })),
            None => warn!("Unknown block alignment, dropping block: {:?}", raw),
        }
    }

    blocks
}

fn split_blocks(lines: &[String]) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Leading-whitespace histogram, split into chunks at sparse bins
///
/// The first chunk is the flush-left action text, the second one the
/// dialogue indentation. The left tolerance sits just past the second chunk.
pub fn detect_left_tolerance(blocks: &[Vec<&str>], auto_tolerance: f64) -> usize {
    info!(
        "Detecting left tolerance with an auto-aligner tolerance of {}",
        auto_tolerance
    );

    let starts: Vec<usize> = blocks
        .iter()
        .flatten()
        .map(|line| leading_whitespace(line))
        .collect();
    let Some(&max_start) = starts.iter().max() else {
        return DEFAULT_LTOL;
    };

    let mut histogram = vec![0usize; max_start + 1];
    for start in &starts {
        histogram[*start] += 1;
    }

    let total = starts.len() as f64;
    let mut chunks: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for (bin, count) in histogram.iter().enumerate() {
        if (*count as f64 / total) < auto_tolerance {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(bin);
        }
    }
    // A run that reaches the last bin is never closed and does not count as a chunk

    match chunks.get(1).and_then(|chunk| chunk.iter().max()) {
        Some(max_bin) => {
            info!("Setting left tolerance to {}", max_bin + 1);
            max_bin + 1
        }
        None => {
            warn!(
                "Could not determine left tolerance from {} whitespace chunk(s), using {}",
                chunks.len(),
                DEFAULT_LTOL
            );
            DEFAULT_LTOL
        }
    }
}

/// Decide the alignment of a block, `None` when it fits no pattern
pub fn classify_block(
    block: &[&str],
    metrics: PageMetrics,
    ltol: usize,
    rtol: usize,
) -> Option<BlockAlignment> {
    let starts: Vec<usize> = block.iter().map(|line| leading_whitespace(line)).collect();
    let ends: Vec<usize> = block
        .iter()
        .map(|line| metrics.width.saturating_sub(char_len(line.trim_end())))
        .collect();

    if starts.iter().zip(&ends).all(|(start, end)| *start > ltol && *end > rtol) {
        return Some(BlockAlignment::Center);
    }
    if starts.iter().all(|start| start.abs_diff(metrics.indent) <= ltol) {
        return Some(BlockAlignment::Left);
    }
    if ends.iter().all(|end| *end < rtol) || starts.iter().all(|start| *start > metrics.width / 2) {
        return Some(BlockAlignment::Right);
    }

    None
}

/// Split side-by-side dialogue into its columns when every line has the same column count
fn split_dual_columns(block: &[&str]) -> Option<Vec<Vec<String>>> {
    let rows: Vec<Vec<&str>> = block
        .iter()
        .map(|line| COLUMN_GAP_REGEX.split(line.trim()).collect())
        .collect();

    let columns = rows.first()?.len();
    if columns < 2 || rows.iter().any(|row| row.len() != columns) {
        return None;
    }

    Some(
        (0..columns)
            .map(|col| rows.iter().map(|row| row[col].trim().to_string()).collect())
            .collect(),
    )
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}
