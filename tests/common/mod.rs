/*!
 * Common test utilities for the script-aligner test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use script_aligner::alignment::{SubtitleCue, TextUnit};
use script_aligner::app_config::{Config, ScriptParserConfig};

/// Screenplay whose dialogue matches `SAMPLE_SRT`, except for one line
pub const SAMPLE_SCREENPLAY: &str = "\
INT. DINER - NIGHT

Rain streaks the windows. MARY sits alone in a booth, stirring her coffee.

                    JOHN
          Is this seat taken?

                    MARY
          It is now.

                    JOHN
          I got your letter.
                    (beat)
          I came as fast as I could.

                    MARY
          You always were slow.
";

/// Subtitles for `SAMPLE_SCREENPLAY`: one sound cue, one dialogue line missing
pub const SAMPLE_SRT: &str = "\
1
00:00:01,000 --> 00:00:02,500
Is this seat taken?

2
00:00:03,000 --> 00:00:04,000
<i>It is now.</i>

3
00:00:05,000 --> 00:00:06,000
[thunder rumbles]

4
00:00:06,500 --> 00:00:08,000
I got your letter.

5
00:00:11,000 --> 00:00:12,500
You always were slow.
";

/// Routes library logs to the test output; `RUST_LOG` picks the level
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Writes `SAMPLE_SRT` and `SAMPLE_SCREENPLAY` as `<stem>.srt` / `<stem>.txt`
pub fn create_sample_pair(dir: &Path, stem: &str) -> Result<(PathBuf, PathBuf)> {
    let srt = create_test_file(dir, &format!("{}.srt", stem), SAMPLE_SRT)?;
    let script = create_test_file(dir, &format!("{}.txt", stem), SAMPLE_SCREENPLAY)?;
    Ok((srt, script))
}

/// Configuration with a fixed left tolerance and lexical scoring
pub fn lexical_config() -> Config {
    let mut config = Config::default();
    config.embedding.enabled = false;
    config.script = ScriptParserConfig {
        ltol: Some(8),
        ..ScriptParserConfig::default()
    };
    config
}

/// Script units from plain strings
pub fn script_units(lines: &[&str]) -> Vec<TextUnit> {
    lines
        .iter()
        .enumerate()
        .map(|(i, text)| TextUnit::new(i, *text))
        .collect()
}

/// Back-to-back two-second cues from plain strings
pub fn subtitle_cues(lines: &[&str]) -> Vec<SubtitleCue> {
    lines
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let start = i as u64 * 2000;
            SubtitleCue::new(i, *text, start, start + 1500)
        })
        .collect()
}
