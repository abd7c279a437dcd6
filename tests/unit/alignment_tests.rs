/*!
 * Tests for the alignment engine and its end-to-end properties
 */

use script_aligner::alignment::{
    AlignmentEngine, AlignmentStep, Resolution, SubtitleCue, TextUnit, align_script,
};
use script_aligner::app_config::AlignmentConfig;
use script_aligner::errors::AlignError;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common;

/// Deterministic, mutually dissimilar lines
fn generated_lines(count: usize, seed: &str) -> Vec<String> {
    (0..count)
        .map(|i| format!("{} line number {} about {}", seed, i, i * 7 % 13))
        .collect()
}

fn as_strs(lines: &[String]) -> Vec<&str> {
    lines.iter().map(String::as_str).collect()
}

/// Test that every index appears exactly once and in increasing order
#[test]
fn test_alignScript_path_shouldCoverBothSequencesMonotonically() {
    let script_lines = generated_lines(30, "script");
    let mut subtitle_lines = generated_lines(30, "script");
    subtitle_lines.retain(|line| !line.contains("number 7 "));
    subtitle_lines.insert(12, "[door slams]".to_string());
    subtitle_lines.push("Extra ad-lib at the end".to_string());

    let script = common::script_units(&as_strs(&script_lines));
    let subtitles = common::subtitle_cues(&as_strs(&subtitle_lines));

    let outcome = align_script(&script, &subtitles, &AlignmentConfig::default()).unwrap();

    assert!(outcome.path.validate(script.len(), subtitles.len()).is_ok());

    let script_indices: Vec<usize> = outcome.path.iter().filter_map(|s| s.script_idx()).collect();
    let subtitle_indices: Vec<usize> = outcome
        .path
        .iter()
        .filter_map(|s| s.subtitle_idx())
        .collect();
    assert_eq!(script_indices, (0..script.len()).collect::<Vec<_>>());
    assert_eq!(subtitle_indices, (0..subtitles.len()).collect::<Vec<_>>());

    // One timed line per script line, in script order
    assert_eq!(outcome.lines.len(), script.len());
    for (idx, line) in outcome.lines.iter().enumerate() {
        assert_eq!(line.script_idx, idx);
    }
}

/// Test that identical sequences align one-to-one at zero cost
#[test]
fn test_alignScript_identicalSequences_shouldMatchEverythingExactly() {
    let lines = [
        "Where were you last night?",
        "Out.",
        "Out where?",
        "Just out, Ma.",
        "Don't you take that tone with me.",
    ];
    let script = common::script_units(&lines);
    let subtitles = common::subtitle_cues(&lines);

    let outcome = align_script(&script, &subtitles, &AlignmentConfig::default()).unwrap();

    assert_eq!(outcome.path.match_count(), 5);
    assert_eq!(outcome.path.len(), 5);
    assert_eq!(outcome.path.total_cost(), 0.0);
    for (idx, line) in outcome.lines.iter().enumerate() {
        assert_eq!(line.resolution, Resolution::Exact);
        assert_eq!(line.start_ms, Some(subtitles[idx].start_ms));
        assert_eq!(line.end_ms, Some(subtitles[idx].end_ms));
    }
}

/// Test that a script line missing from the subtitles is interpolated between its neighbors
#[test]
fn test_alignScript_missingMiddleLine_shouldBeInterpolated() {
    let script = common::script_units(&[
        "Good morning, Alice.",
        "The weather is dreadful today.",
        "Shall we go inside?",
    ]);
    let subtitles = vec![
        SubtitleCue::new(0, "Good morning, Alice.", 1000, 2000),
        SubtitleCue::new(1, "Shall we go inside?", 5000, 6000),
    ];

    let outcome = align_script(&script, &subtitles, &AlignmentConfig::default()).unwrap();

    assert_eq!(
        outcome.path.steps()[1],
        AlignmentStep::ScriptGap { script_idx: 1 }
    );
    assert_eq!(outcome.lines[1].resolution, Resolution::Interpolated);
    assert_eq!(outcome.lines[1].start_ms, Some(2000));
    assert_eq!(outcome.lines[1].end_ms, Some(5000));
    assert_eq!(outcome.lines[2].resolution, Resolution::Exact);
}

/// Test that an unmatched opening line has no anchor and stays unresolved
#[test]
fn test_alignScript_leadingUnmatchedLine_shouldBeUnresolved() {
    let script = common::script_units(&["Completely unrelated opening narration", "Hello there"]);
    let subtitles = vec![SubtitleCue::new(0, "Hello there", 4000, 5000)];

    let outcome = align_script(&script, &subtitles, &AlignmentConfig::default()).unwrap();

    assert_eq!(outcome.lines[0].resolution, Resolution::Unresolved);
    assert_eq!(outcome.lines[0].start_ms, None);
    assert_eq!(outcome.lines[0].end_ms, None);
    assert_eq!(outcome.lines[1].resolution, Resolution::Exact);
}

/// Test that an empty script produces one subtitle gap per cue and no lines
#[test]
fn test_alignScript_emptyScript_shouldProduceOnlySubtitleGaps() {
    let subtitles = common::subtitle_cues(&["one", "two", "three"]);

    let outcome = align_script(&[], &subtitles, &AlignmentConfig::default()).unwrap();

    assert_eq!(outcome.path.subtitle_gap_count(), 3);
    assert_eq!(outcome.path.len(), 3);
    assert!(outcome.lines.is_empty());
    assert!((outcome.path.total_cost() - 0.9).abs() < 1e-9);
}

/// Test that an empty subtitle track leaves every script line unresolved
#[test]
fn test_alignScript_emptySubtitles_shouldLeaveEverythingUnresolved() {
    let script = common::script_units(&["one", "two"]);

    let outcome = align_script(&script, &[], &AlignmentConfig::default()).unwrap();

    assert_eq!(outcome.path.script_gap_count(), 2);
    assert!(
        outcome
            .lines
            .iter()
            .all(|line| line.resolution == Resolution::Unresolved)
    );
}

/// Test that raising the subtitle gap cost never increases the number of subtitle gaps
#[test]
fn test_alignScript_higherSubtitleGapCost_shouldNotAddSubtitleGaps() {
    let script = common::script_units(&[
        "I will see you tomorrow",
        "please pass the salt",
        "goodbye for now",
    ]);
    let subtitles = common::subtitle_cues(&[
        "I will see you tomorrow",
        "the bridge collapsed",
        "goodbye for now",
    ]);

    let gap_counts: Vec<usize> = [0.1, 0.3, 0.6, 1.0]
        .iter()
        .map(|&gap_subtitle_cost| {
            let config = AlignmentConfig {
                gap_subtitle_cost,
                ..AlignmentConfig::default()
            };
            align_script(&script, &subtitles, &config)
                .unwrap()
                .path
                .subtitle_gap_count()
        })
        .collect();

    assert!(gap_counts.windows(2).all(|pair| pair[0] >= pair[1]));
    assert_eq!(gap_counts[0], 1);
    assert_eq!(gap_counts[3], 0);
}

/// Script lines and a subtitle track derived from them with random drops and sound cues
fn noisy_subtitles(rng: &mut StdRng, script_lines: &[String]) -> Vec<String> {
    let mut subtitle_lines = Vec::new();
    for (i, line) in script_lines.iter().enumerate() {
        if rng.random_bool(0.2) {
            subtitle_lines.push(format!("[sound effect {}]", i));
        }
        if !rng.random_bool(0.2) {
            subtitle_lines.push(line.clone());
        }
    }
    subtitle_lines
}

/// Test the subtitle gap monotonicity over several generated script/subtitle pairs
#[test]
fn test_alignScript_subtitleGapCostSweep_shouldNeverAddSubtitleGaps() {
    let costs = [0.05, 0.1, 0.3, 0.6, 1.0, 2.0];
    let mut rng = StdRng::seed_from_u64(42);
    let mut sweep_changed = false;

    for round in 0..8 {
        let len = rng.random_range(10..40);
        let script_lines = generated_lines(len, &format!("take{}", round));
        let subtitle_lines = noisy_subtitles(&mut rng, &script_lines);

        let script = common::script_units(&as_strs(&script_lines));
        let subtitles = common::subtitle_cues(&as_strs(&subtitle_lines));

        let gap_counts: Vec<usize> = costs
            .iter()
            .map(|&gap_subtitle_cost| {
                let config = AlignmentConfig {
                    gap_subtitle_cost,
                    ..AlignmentConfig::default()
                };
                align_script(&script, &subtitles, &config)
                    .unwrap()
                    .path
                    .subtitle_gap_count()
            })
            .collect();

        assert!(
            gap_counts.windows(2).all(|pair| pair[0] >= pair[1]),
            "round {}: gap counts {:?}",
            round,
            gap_counts
        );
        sweep_changed |= gap_counts[0] > gap_counts[costs.len() - 1];
    }

    assert!(sweep_changed);
}

/// Test that subtitle-only cues cost more than script-only lines by default
#[test]
fn test_alignScript_defaultGapCosts_shouldBeAsymmetric() {
    let config = AlignmentConfig::default();
    assert!((config.gap_script_cost - 0.1).abs() < 1e-9);
    assert!((config.gap_subtitle_cost - 0.3).abs() < 1e-9);

    let script = common::script_units(&["alpha"]);
    let subtitles = common::subtitle_cues(&["alpha", "beta"]);
    let outcome = align_script(&script, &subtitles, &config).unwrap();
    assert!((outcome.path.total_cost() - 0.3).abs() < 1e-9);
}

/// Test the default band width rule
#[test]
fn test_effectiveBandWidth_shouldUseLengthDifference() {
    let config = AlignmentConfig::default();
    assert_eq!(config.effective_band_width(10, 12), 20);
    assert_eq!(config.effective_band_width(10, 100), 180);

    let fixed = AlignmentConfig {
        band_width: Some(5),
        ..AlignmentConfig::default()
    };
    assert_eq!(fixed.effective_band_width(10, 100), 5);
}

/// Test that a too narrow band is widened once and then succeeds
#[test]
fn test_engine_narrowBand_shouldRecoverAfterRetry() {
    let config = AlignmentConfig {
        band_width: Some(0),
        ..AlignmentConfig::default()
    };
    let engine = AlignmentEngine::new(config).unwrap();
    let script = common::script_units(&["a b", "c d", "e f"]);
    let subtitles = common::subtitle_cues(&["x", "y", "z", "a b", "c d", "e f"]);

    // Width 0 keeps only the cells on the 1:2 diagonal, which never touch
    assert_eq!(
        engine.align_within_band(&script, &subtitles, 0),
        Err(AlignError::BandTooNarrow { band_width: 0 })
    );

    let path = engine.align(&script, &subtitles).unwrap();
    assert!(path.validate(3, 6).is_ok());
}

/// Test that decreasing cue start times are rejected before any work is done
#[test]
fn test_alignScript_nonMonotonicCues_shouldFail() {
    let script = common::script_units(&["a"]);
    let subtitles = vec![
        SubtitleCue::new(0, "a", 3000, 4000),
        SubtitleCue::new(1, "b", 1000, 2000),
    ];

    let result = align_script(&script, &subtitles, &AlignmentConfig::default());
    assert!(matches!(result, Err(AlignError::InvalidInput(_))));
}

/// Test that embeddings of different sizes are rejected
#[test]
fn test_alignScript_embeddingDimensionMismatch_shouldFail() {
    let script = vec![TextUnit::new(0, "hello").with_embedding(vec![1.0, 0.0, 0.0])];
    let subtitles = vec![SubtitleCue::new(0, "hello", 0, 1000).with_embedding(vec![1.0, 0.0])];

    let result = align_script(&script, &subtitles, &AlignmentConfig::default());
    assert!(matches!(result, Err(AlignError::InvalidInput(_))));
}

/// Test that weights not summing to one are rejected
#[test]
fn test_alignScript_invalidWeights_shouldFail() {
    let config = AlignmentConfig {
        lexical_weight: 0.9,
        semantic_weight: 0.3,
        ..AlignmentConfig::default()
    };

    let result = align_script(&[], &[], &config);
    assert!(matches!(result, Err(AlignError::InvalidInput(_))));
}

/// Test that embeddings can pull a paraphrase onto the right cue
#[test]
fn test_alignScript_semanticEmbeddings_shouldPreferSimilarVectors() {
    // Both cues read the same; only the vectors differ
    let script = vec![TextUnit::new(0, "abcd").with_embedding(vec![1.0, 0.0])];
    let subtitles = vec![
        SubtitleCue::new(0, "abcx", 0, 1000).with_embedding(vec![0.0, 1.0]),
        SubtitleCue::new(1, "abcx", 2000, 3000).with_embedding(vec![1.0, 0.0]),
    ];

    let outcome = align_script(&script, &subtitles, &AlignmentConfig::default()).unwrap();

    assert_eq!(outcome.lines[0].start_ms, Some(2000));
    assert_eq!(outcome.path.subtitle_gap_count(), 1);
}
