/*!
 * Side-by-side HTML report of an alignment.
 *
 * One table row per path step: script text on the left, subtitle text on
 * the right. Gap rows are highlighted so unmatched lines stand out.
 */

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use chrono::Local;

use crate::alignment::{AlignmentPath, AlignmentStep, SubtitleCue, TextUnit};
use crate::file_utils::FileManager;
use crate::subtitle_processor::SubtitleEntry;

const STYLE: &str = "\
body { font-family: monospace; background: #1e1e1e; color: #ddd; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #444; padding: 2px 8px; vertical-align: top; }
td.script { text-align: right; width: 45%; }
td.subtitle { text-align: left; width: 45%; }
td.time { white-space: nowrap; color: #888; }
tr.gap td.script, tr.gap td.subtitle { color: #e05252; }
";

/// Render the alignment report as a standalone HTML document
pub fn render_html(path: &AlignmentPath, script: &[TextUnit], subtitles: &[SubtitleCue]) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Alignment</title>\n<style>\n");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    let _ = writeln!(
        html,
        "<h1>Alignment</h1>\n<p>{} matches, {} script gaps, {} subtitle gaps, total cost {:.3}. Generated {}.</p>",
        path.match_count(),
        path.script_gap_count(),
        path.subtitle_gap_count(),
        path.total_cost(),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    html.push_str("<table>\n<tr><th>Script</th><th>Subtitle</th><th>Time</th><th>Cost</th></tr>\n");

    for step in path {
        let (class, script_text, subtitle_text, time, cost) = match *step {
            AlignmentStep::Match {
                script_idx,
                subtitle_idx,
                cost,
            } => (
                "match",
                cell_text(script.get(script_idx).map(|unit| unit.raw_text.as_str())),
                cell_text(subtitles.get(subtitle_idx).map(|cue| cue.unit.raw_text.as_str())),
                cue_time(subtitles.get(subtitle_idx)),
                format!("{:.3}", cost),
            ),
            AlignmentStep::ScriptGap { script_idx } => (
                "gap",
                cell_text(script.get(script_idx).map(|unit| unit.raw_text.as_str())),
                String::new(),
                String::new(),
                String::new(),
            ),
            AlignmentStep::SubtitleGap { subtitle_idx } => (
                "gap",
                String::new(),
                cell_text(subtitles.get(subtitle_idx).map(|cue| cue.unit.raw_text.as_str())),
                cue_time(subtitles.get(subtitle_idx)),
                String::new(),
            ),
        };

        let _ = writeln!(
            html,
            "<tr class=\"{}\"><td class=\"script\">{}</td><td class=\"subtitle\">{}</td><td class=\"time\">{}</td><td>{}</td></tr>",
            class, script_text, subtitle_text, time, cost
        );
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

/// Render the report and save it to `output`
pub fn write_html<P: AsRef<Path>>(
    output: P,
    path: &AlignmentPath,
    script: &[TextUnit],
    subtitles: &[SubtitleCue],
) -> Result<()> {
    FileManager::write_to_file(output, &render_html(path, script, subtitles))
}

/// Escape text for use inside HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '\n' => escaped.push_str("<br>"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn cell_text(text: Option<&str>) -> String {
    text.map(escape_html).unwrap_or_default()
}

fn cue_time(cue: Option<&SubtitleCue>) -> String {
    cue.map(|cue| {
        format!(
            "{} - {}",
            SubtitleEntry::format_timestamp(cue.start_ms),
            SubtitleEntry::format_timestamp(cue.end_ms)
        )
    })
    .unwrap_or_default()
}
