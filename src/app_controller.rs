use anyhow::{Context, Result, anyhow};
use futures::stream::{self, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::alignment::{AlignmentStep, Resolution, align_script};
use crate::app_config::Config;
use crate::embedding::{EmbeddingCache, Embedder, attach_embeddings, create_embedder};
use crate::file_utils::{FileManager, FileType, InputPair};
use crate::report;
use crate::screenplay::Screenplay;
use crate::subtitle_processor::SubtitleCollection;

// @module: Application controller for script alignment

/// Where the results of one alignment run go
#[derive(Debug, Clone, PartialEq)]
pub struct AlignOptions {
    // @field: HTML side-by-side report
    pub report_path: PathBuf,
    // @field: Annotated screenplay events as JSON
    pub script_blocks_path: Option<PathBuf>,
    // @field: Timed script lines as JSON
    pub timed_output_path: Option<PathBuf>,
    // @field: Timed script lines as SRT
    pub srt_output_path: Option<PathBuf>,
    pub use_embeddings: bool,
}

impl AlignOptions {
    pub fn new(report_path: impl Into<PathBuf>) -> Self {
        Self {
            report_path: report_path.into(),
            script_blocks_path: None,
            timed_output_path: None,
            srt_output_path: None,
            use_embeddings: true,
        }
    }

    /// Outputs written next to the subtitle file, named after its stem
    pub fn beside_input(subtitle: &Path) -> Self {
        let dir = subtitle.parent().unwrap_or_else(|| Path::new(""));
        Self {
            report_path: FileManager::generate_output_path(subtitle, dir, "alignment", "html"),
            script_blocks_path: Some(FileManager::generate_output_path(
                subtitle, dir, "events", "json",
            )),
            timed_output_path: Some(FileManager::generate_output_path(
                subtitle, dir, "timed", "json",
            )),
            srt_output_path: None,
            use_embeddings: true,
        }
    }
}

/// Figures for one finished alignment run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlignmentSummary {
    pub script_lines: usize,
    pub subtitle_cues: usize,
    pub matches: usize,
    pub script_gaps: usize,
    pub subtitle_gaps: usize,
    pub interpolated: usize,
    pub unresolved: usize,
    pub embedding_failures: usize,
    pub total_cost: f64,
}

/// Outcome counts of a batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Main application controller for script alignment
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Embedding backend, absent when embeddings are disabled
    embedder: Option<Arc<dyn Embedder>>,
}

impl Controller {
    /// Create a controller for test purposes with embeddings disabled
    pub fn new_for_test() -> Result<Self> {
        let mut config = Config::default();
        config.embedding.enabled = false;
        Self::with_config(config)
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let embedder = config
            .embedding
            .enabled
            .then(|| create_embedder(&config.embedding));
        Ok(Self { config, embedder })
    }

    // @method: Create a controller with an explicit embedding backend
    pub fn with_embedder(config: Config, embedder: Arc<dyn Embedder>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            embedder: Some(embedder),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Align a subtitle file with a screenplay and write the requested outputs
    pub async fn align_files(
        &self,
        subtitle_file: &Path,
        script_file: &Path,
        options: &AlignOptions,
    ) -> Result<AlignmentSummary> {
        let multi_progress = MultiProgress::new();
        self.align_files_with_progress(subtitle_file, script_file, options, &multi_progress)
            .await
    }

    async fn align_files_with_progress(
        &self,
        subtitle_file: &Path,
        script_file: &Path,
        options: &AlignOptions,
        multi_progress: &MultiProgress,
    ) -> Result<AlignmentSummary> {
        let start_time = std::time::Instant::now();
        info!("Aligning {:?} and {:?}", subtitle_file, script_file);
        check_inputs(subtitle_file, script_file)?;

        info!("Step 1: Parsing the script into blocks");
        let mut screenplay = Screenplay::from_file(script_file, &self.config.script)?;
        let dialogue = screenplay.dialogue_units();
        let mut script_units = dialogue.units.clone();

        info!("Step 2: Loading SRT");
        let subtitles = SubtitleCollection::from_srt_file(subtitle_file)?;
        let mut cues = subtitles.to_cues();

        let mut embedding_failures = 0;
        let mut alignment_config = self.config.alignment.clone();
        match self.embedder.as_ref().filter(|_| options.use_embeddings) {
            Some(embedder) => {
                info!("Step 3: Embedding text with {}", embedder.name());
                let progress_bar = multi_progress.add(ProgressBar::new(0));
                let style = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} texts ({percent}%) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar());
                progress_bar.set_style(style);
                progress_bar.set_message("Embedding");

                let cache = EmbeddingCache::new();
                embedding_failures = attach_embeddings(
                    embedder.as_ref(),
                    &cache,
                    &mut script_units,
                    &mut cues,
                    self.config.embedding.concurrent_requests,
                    Some(&progress_bar),
                )
                .await;
                progress_bar.finish_and_clear();
            }
            None => {
                info!("Step 3: Embeddings disabled, scoring lexically");
                alignment_config = alignment_config.lexical_only();
            }
        }

        info!(
            "Step 4: Aligning {} script lines with {} subtitles",
            script_units.len(),
            cues.len()
        );
        // The dynamic program is CPU-bound
        let (script_units, cues, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = align_script(&script_units, &cues, &alignment_config);
            (script_units, cues, outcome)
        })
        .await
        .context("Alignment task failed")?;
        let outcome = outcome.context("Alignment failed")?;

        let mut matched_text: Vec<Option<String>> = vec![None; script_units.len()];
        for step in &outcome.path {
            if let AlignmentStep::Match {
                script_idx,
                subtitle_idx,
                ..
            } = *step
            {
                matched_text[script_idx] = Some(cues[subtitle_idx].unit.raw_text.clone());
            }
        }
        screenplay.apply_timings(&dialogue, &outcome.lines, &matched_text);

        info!("Step 5: Saving alignment to HTML");
        report::write_html(&options.report_path, &outcome.path, &script_units, &cues)?;

        if let Some(path) = &options.script_blocks_path {
            FileManager::write_json(path, &screenplay.events)?;
            debug!("Script blocks written to {:?}", path);
        }
        if let Some(path) = &options.timed_output_path {
            FileManager::write_json(path, &outcome.lines)?;
            debug!("Timed script written to {:?}", path);
        }
        if let Some(path) = &options.srt_output_path {
            SubtitleCollection::from_timed_lines(script_file.to_path_buf(), &outcome.lines)
                .write_to_srt(path)?;
            debug!("Timed script SRT written to {:?}", path);
        }

        let count = |resolution: Resolution| {
            outcome
                .lines
                .iter()
                .filter(|line| line.resolution == resolution)
                .count()
        };
        let summary = AlignmentSummary {
            script_lines: script_units.len(),
            subtitle_cues: cues.len(),
            matches: outcome.path.match_count(),
            script_gaps: outcome.path.script_gap_count(),
            subtitle_gaps: outcome.path.subtitle_gap_count(),
            interpolated: count(Resolution::Interpolated),
            unresolved: count(Resolution::Unresolved),
            embedding_failures,
            total_cost: outcome.path.total_cost(),
        };

        info!(
            "Alignment completed in {}: {} matched, {} interpolated, {} unresolved",
            Self::format_duration(start_time.elapsed()),
            summary.matches,
            summary.interpolated,
            summary.unresolved
        );

        Ok(summary)
    }

    /// Align every `<stem>.srt` / `<stem>.txt` pair found under a directory
    pub async fn run_batch(&self, input_dir: &Path) -> Result<BatchSummary> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let pairs = FileManager::find_input_pairs(input_dir)?;
        if pairs.is_empty() {
            return Err(anyhow!(
                "No subtitle/script pairs found in directory: {:?}",
                input_dir
            ));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(pairs.len() as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pairs ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style);
        folder_pb.set_message("Aligning pairs");

        let concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2);

        let results: Vec<(InputPair, Result<AlignmentSummary>)> = stream::iter(pairs)
            .map(|pair| {
                let multi_progress = &multi_progress;
                let folder_pb = &folder_pb;
                async move {
                    let options = AlignOptions::beside_input(&pair.subtitle);
                    let result = self
                        .align_files_with_progress(
                            &pair.subtitle,
                            &pair.script,
                            &options,
                            multi_progress,
                        )
                        .await;
                    folder_pb.inc(1);
                    (pair, result)
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        folder_pb.finish_and_clear();

        let mut summary = BatchSummary::default();
        for (pair, result) in results {
            match result {
                Ok(_) => summary.succeeded += 1,
                Err(e) => {
                    error!("Error aligning {:?}: {:#}", pair.subtitle, e);
                    summary.failed += 1;
                }
            }
        }

        let message = format!(
            "Batch completed in {}: {} aligned, {} failed",
            Self::format_duration(start_time.elapsed()),
            summary.succeeded,
            summary.failed
        );
        if summary.failed > 0 {
            warn!("{}", message);
        } else {
            info!("{}", message);
        }

        Ok(summary)
    }

    /// Format a duration as `1h 2m 3s`, `2m 3s` or `3.250s`
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/// Reject missing inputs and inputs that hold the wrong kind of file
fn check_inputs(subtitle_file: &Path, script_file: &Path) -> Result<()> {
    for (path, expected) in [
        (subtitle_file, FileType::Subtitle),
        (script_file, FileType::Screenplay),
    ] {
        if !FileManager::file_exists(path) {
            return Err(anyhow!("Input file does not exist: {:?}", path));
        }

        let detected = FileManager::detect_file_type(path)?;
        if detected != expected {
            return Err(anyhow!(
                "Expected a {:?} file but {:?} looks like {:?}",
                expected,
                path,
                detected
            ));
        }
    }
    Ok(())
}
