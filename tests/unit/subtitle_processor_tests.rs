/*!
 * Tests for subtitle processing functionality
 */

use anyhow::Result;
use script_aligner::alignment::{Resolution, TimedScriptLine};
use script_aligner::subtitle_processor::{SubtitleCollection, SubtitleEntry, strip_markup};

use crate::common;

/// Test parsing the sample SRT from disk
#[test]
fn test_fromSrtFile_withSample_shouldLoadAllEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "sample.srt", common::SAMPLE_SRT)?;

    let collection = SubtitleCollection::from_srt_file(&path)?;

    assert_eq!(collection.entries.len(), 5);
    assert_eq!(collection.source_file, path);
    assert_eq!(collection.entries[1].text, "<i>It is now.</i>");
    assert_eq!(collection.entries[4].start_time_ms, 11_000);
    assert_eq!(collection.entries[4].end_time_ms, 12_500);
    Ok(())
}

/// Test that cues handed to the aligner are free of markup
#[test]
fn test_toCues_shouldStripMarkupAndKeepTimes() -> Result<()> {
    let entries = SubtitleCollection::parse_srt_string(common::SAMPLE_SRT)?;
    let collection = SubtitleCollection {
        source_file: "sample.srt".into(),
        entries,
    };

    let cues = collection.to_cues();

    assert_eq!(cues.len(), 5);
    assert_eq!(cues[1].unit.raw_text, "It is now.");
    assert_eq!(cues[1].unit.normalized_text, "it is now");
    assert_eq!(cues[1].start_ms, 3000);
    assert_eq!(cues[2].unit.normalized_text, "thunder rumbles");
    for (idx, cue) in cues.iter().enumerate() {
        assert_eq!(cue.unit.id, idx);
    }
    Ok(())
}

/// Test that out-of-order entries come back sorted and renumbered
#[test]
fn test_parseSrtString_outOfOrder_shouldSortAndRenumber() -> Result<()> {
    let content = "\
7
00:00:05,000 --> 00:00:06,000
Second

3
00:00:01,000 --> 00:00:02,000
First
";
    let entries = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(entries[0].text, "First");
    assert_eq!(entries[0].seq_num, 1);
    assert_eq!(entries[1].text, "Second");
    assert_eq!(entries[1].seq_num, 2);
    Ok(())
}

/// Test that entries with an inverted interval are skipped
#[test]
fn test_parseSrtString_invalidInterval_shouldSkipEntry() -> Result<()> {
    let content = "\
1
00:00:05,000 --> 00:00:04,000
Backwards

2
00:00:06,000 --> 00:00:07,000
Fine
";
    let entries = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "Fine");
    Ok(())
}

/// Test that a zero-length cue is kept and reaches the aligner
#[test]
fn test_parseSrtString_zeroLengthCue_shouldKeepEntry() -> Result<()> {
    let content = "\
1
00:00:05,000 --> 00:00:05,000
Flash

2
00:00:06,000 --> 00:00:07,000
Fine
";
    let entries = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].start_time_ms, 5000);
    assert_eq!(entries[0].end_time_ms, 5000);
    assert!(SubtitleEntry::new_validated(1, 5000, 5000, "Flash".to_string()).is_ok());
    assert!(SubtitleEntry::new_validated(1, 5001, 5000, "Back".to_string()).is_err());
    Ok(())
}

/// Test timestamp parsing and formatting
#[test]
fn test_timestamps_shouldParseAndFormat() {
    assert_eq!(SubtitleEntry::parse_timestamp("00:01:02,345").unwrap(), 62_345);
    assert_eq!(SubtitleEntry::format_timestamp(3_723_004), "01:02:03,004");
    assert!(SubtitleEntry::parse_timestamp("1:2").is_err());
    assert!(SubtitleEntry::parse_timestamp("aa:bb:cc,ddd").is_err());
}

/// Test markup removal
#[test]
fn test_stripMarkup_shouldRemoveTagsAndOverrides() {
    assert_eq!(strip_markup("<b>Bold</b> and {\\i1}slanted"), "Bold and slanted");
    assert_eq!(strip_markup("No markup"), "No markup");
}

/// Test writing timed script lines as SRT and reading them back
#[test]
fn test_writeToSrt_fromTimedLines_shouldBeReadable() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("nested").join("script.srt");
    let lines = vec![
        TimedScriptLine {
            script_idx: 0,
            raw_text: "Is this seat taken?".to_string(),
            start_ms: Some(1000),
            end_ms: Some(2500),
            resolution: Resolution::Exact,
        },
        TimedScriptLine {
            script_idx: 1,
            raw_text: "I came as fast as I could.".to_string(),
            start_ms: Some(8000),
            end_ms: Some(11_000),
            resolution: Resolution::Interpolated,
        },
    ];

    SubtitleCollection::from_timed_lines("script.txt".into(), &lines).write_to_srt(&output)?;
    let reloaded = SubtitleCollection::from_srt_file(&output)?;

    assert_eq!(reloaded.entries.len(), 2);
    assert_eq!(reloaded.entries[1].text, "I came as fast as I could.");
    assert_eq!(reloaded.entries[1].start_time_ms, 8000);
    assert_eq!(reloaded.entries[1].end_time_ms, 11_000);
    Ok(())
}

/// Test that a missing file is reported as an error
#[test]
fn test_fromSrtFile_missingFile_shouldFail() {
    assert!(SubtitleCollection::from_srt_file("/nonexistent/path/movie.srt").is_err());
}
