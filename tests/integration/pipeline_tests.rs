/*!
 * End-to-end tests of the alignment pipeline
 */

use anyhow::Result;
use std::sync::Arc;

use script_aligner::alignment::{Resolution, TimedScriptLine};
use script_aligner::app_controller::{AlignOptions, AlignmentSummary, Controller};
use script_aligner::embedding::{HashingEmbedder, MockEmbedder};
use script_aligner::screenplay::ScriptEvent;
use script_aligner::subtitle_processor::SubtitleCollection;

use crate::common;

fn assert_sample_summary(summary: &AlignmentSummary) {
    assert_eq!(summary.script_lines, 5);
    assert_eq!(summary.subtitle_cues, 5);
    assert_eq!(summary.matches, 4);
    assert_eq!(summary.script_gaps, 1);
    assert_eq!(summary.subtitle_gaps, 1);
    assert_eq!(summary.interpolated, 1);
    assert_eq!(summary.unresolved, 0);
}

/// Test the full pipeline with lexical scoring and every output enabled
#[tokio::test]
async fn test_alignFiles_lexical_shouldWriteAllOutputs() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let (srt, script) = common::create_sample_pair(temp_dir.path(), "diner")?;
    let out_dir = temp_dir.path().join("out");

    let options = AlignOptions {
        report_path: out_dir.join("report.html"),
        script_blocks_path: Some(out_dir.join("events.json")),
        timed_output_path: Some(out_dir.join("timed.json")),
        srt_output_path: Some(out_dir.join("script.srt")),
        use_embeddings: false,
    };

    let controller = Controller::with_config(common::lexical_config())?;
    let summary = controller.align_files(&srt, &script, &options).await?;

    assert_sample_summary(&summary);
    assert_eq!(summary.embedding_failures, 0);
    // One script gap and one subtitle gap, every match exact
    assert!((summary.total_cost - 0.4).abs() < 1e-9);

    // Timed lines
    let timed: Vec<TimedScriptLine> =
        serde_json::from_str(&std::fs::read_to_string(out_dir.join("timed.json"))?)?;
    assert_eq!(timed.len(), 5);
    assert_eq!(timed[3].raw_text, "I came as fast as I could.");
    assert_eq!(timed[3].resolution, Resolution::Interpolated);
    assert_eq!(timed[3].start_ms, Some(8000));
    assert_eq!(timed[3].end_ms, Some(11_000));
    assert_eq!(timed[1].start_ms, Some(3000));

    // Annotated events
    let events: Vec<ScriptEvent> =
        serde_json::from_str(&std::fs::read_to_string(out_dir.join("events.json"))?)?;
    assert_eq!(events.len(), 7);
    assert!(events[0].timing.is_none());
    let matched = events[3].timing.as_ref().unwrap();
    assert_eq!(matched.subtitle.as_deref(), Some("It is now."));
    assert_eq!(matched.resolution, Resolution::Exact);
    let interpolated = events[5].timing.as_ref().unwrap();
    assert_eq!(interpolated.subtitle, None);
    assert_eq!(interpolated.subtitle_start, Some(8000));

    // Report
    let html = std::fs::read_to_string(out_dir.join("report.html"))?;
    assert!(html.contains("4 matches, 1 script gaps, 1 subtitle gaps"));
    assert!(html.contains("thunder rumbles"));
    assert!(html.contains("class=\"gap\""));

    // Script as subtitles
    let srt_out = SubtitleCollection::from_srt_file(out_dir.join("script.srt"))?;
    assert_eq!(srt_out.entries.len(), 5);
    assert_eq!(srt_out.entries[0].text, "Is this seat taken?");
    assert_eq!(srt_out.entries[3].start_time_ms, 8000);
    Ok(())
}

/// Test the pipeline with the hashing embedder attached
#[tokio::test]
async fn test_alignFiles_withHashingEmbeddings_shouldAgreeWithLexical() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (srt, script) = common::create_sample_pair(temp_dir.path(), "diner")?;
    let options = AlignOptions::new(temp_dir.path().join("report.html"));

    let controller =
        Controller::with_embedder(common::lexical_config(), Arc::new(HashingEmbedder::new(128)))?;
    let summary = controller.align_files(&srt, &script, &options).await?;

    assert_sample_summary(&summary);
    assert_eq!(summary.embedding_failures, 0);
    assert!(temp_dir.path().join("report.html").exists());
    Ok(())
}

/// Test that a failing embedding backend degrades to lexical scoring
#[tokio::test]
async fn test_alignFiles_failingEmbedder_shouldFallBackToLexical() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (srt, script) = common::create_sample_pair(temp_dir.path(), "diner")?;
    let options = AlignOptions::new(temp_dir.path().join("report.html"));

    let controller =
        Controller::with_embedder(common::lexical_config(), Arc::new(MockEmbedder::failing()))?;
    let summary = controller.align_files(&srt, &script, &options).await?;

    assert_sample_summary(&summary);
    assert_eq!(summary.embedding_failures, 10);
    Ok(())
}

/// Test that disabling embeddings per run skips the backend entirely
#[tokio::test]
async fn test_alignFiles_embeddingsDisabledForRun_shouldNotCallBackend() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (srt, script) = common::create_sample_pair(temp_dir.path(), "diner")?;
    let mut options = AlignOptions::new(temp_dir.path().join("report.html"));
    options.use_embeddings = false;

    let embedder = Arc::new(MockEmbedder::working());
    let controller = Controller::with_embedder(common::lexical_config(), embedder.clone())?;
    let summary = controller.align_files(&srt, &script, &options).await?;

    assert_sample_summary(&summary);
    assert_eq!(embedder.request_count(), 0);
    Ok(())
}

/// Test that outputs named after the subtitle file land next to it
#[tokio::test]
async fn test_alignFiles_besideInput_shouldNameOutputsAfterStem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (srt, script) = common::create_sample_pair(temp_dir.path(), "diner")?;
    let mut options = AlignOptions::beside_input(&srt);
    options.use_embeddings = false;

    let controller = Controller::with_config(common::lexical_config())?;
    controller.align_files(&srt, &script, &options).await?;

    assert!(temp_dir.path().join("diner.alignment.html").exists());
    assert!(temp_dir.path().join("diner.events.json").exists());
    assert!(temp_dir.path().join("diner.timed.json").exists());
    Ok(())
}

/// Test that missing or unusable inputs are reported
#[tokio::test]
async fn test_alignFiles_badInputs_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (srt, script) = common::create_sample_pair(temp_dir.path(), "diner")?;
    let empty_script = common::create_test_file(temp_dir.path(), "empty.txt", "\n\n")?;
    let broken_srt = common::create_test_file(temp_dir.path(), "broken.srt", "no cues here\n")?;
    let options = AlignOptions::new(temp_dir.path().join("report.html"));
    let controller = Controller::new_for_test()?;

    assert!(
        controller
            .align_files(&temp_dir.path().join("missing.srt"), &script, &options)
            .await
            .is_err()
    );
    assert!(controller.align_files(&srt, &empty_script, &options).await.is_err());
    assert!(controller.align_files(&broken_srt, &script, &options).await.is_err());
    Ok(())
}

/// Test that a screenplay passed as the subtitle input is rejected before parsing
#[tokio::test]
async fn test_alignFiles_swappedInputs_shouldRejectFileType() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (srt, script) = common::create_sample_pair(temp_dir.path(), "diner")?;
    let options = AlignOptions::new(temp_dir.path().join("report.html"));
    let controller = Controller::with_config(common::lexical_config())?;

    let result = controller.align_files(&script, &srt, &options).await;

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("Expected a Subtitle file"), "got: {}", message);
    assert!(!temp_dir.path().join("report.html").exists());
    Ok(())
}
