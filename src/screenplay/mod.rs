/*!
 * Plain-text screenplay parsing.
 *
 * - `layout`: page furniture filtering and block alignment detection
 * - `events`: block classification into typed script events
 *
 * The dialogue events become the script side of the alignment; the timing
 * recovered for each dialogue line is written back onto its event.
 */

pub mod events;
pub mod layout;

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::alignment::{Resolution, TextUnit, TimedScriptLine};
use crate::app_config::ScriptParserConfig;
use crate::errors::ParseError;
use crate::file_utils::FileManager;

/// Kind of a screenplay event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Dialogue,
    Setting,
    CameraAction,
    Description,
    Metadata,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::Dialogue => "dialogue",
            EventKind::Setting => "setting",
            EventKind::CameraAction => "camera_action",
            EventKind::Description => "description",
            EventKind::Metadata => "metadata",
        };
        write!(f, "{}", label)
    }
}

/// Timing written back onto a dialogue event after alignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTiming {
    /// Text of the matched subtitle cue, absent for interpolated lines
    pub subtitle: Option<String>,
    pub subtitle_start: Option<u64>,
    pub subtitle_end: Option<u64>,
    pub resolution: Resolution,
}

/// One event of a parsed screenplay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub kind: EventKind,
    pub content: String,

    // @field: Character cue without voice modifiers (dialogue only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,

    // @field: Modifiers such as `V.O.` or `CONT'D` from the character cue
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub voice_modifiers: Vec<String>,

    // @field: Parenthetical preceding this part of the speech
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialogue_action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<EventTiming>,
}

impl ScriptEvent {
    pub fn new(kind: EventKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            speaker: None,
            voice_modifiers: Vec::new(),
            dialogue_action: None,
            timing: None,
        }
    }

    pub fn is_dialogue(&self) -> bool {
        self.kind == EventKind::Dialogue
    }
}

/// Script text units for the aligner plus the event each one came from
#[derive(Debug, Clone, Default)]
pub struct DialogueUnits {
    pub units: Vec<TextUnit>,
    // @field: event_indices[i] is the index of the event behind units[i]
    pub event_indices: Vec<usize>,
}

/// A parsed screenplay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Screenplay {
    pub events: Vec<ScriptEvent>,
}

impl Screenplay {
    /// Parse screenplay text laid out in the usual industry format
    pub fn parse(content: &str, config: &ScriptParserConfig) -> Result<Self, ParseError> {
        let lines = layout::filter_lines(content);
        if lines.iter().all(|line| line.trim().is_empty()) {
            return Err(ParseError::EmptyScript);
        }

        let blocks = layout::extract_blocks(&lines, config);
        let events = events::parse_blocks(&blocks);

        Ok(Self { events })
    }

    /// Read and parse a screenplay file
    pub fn from_file<P: AsRef<Path>>(path: P, config: &ScriptParserConfig) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)
            .with_context(|| format!("Failed to read screenplay: {:?}", path))?;

        let screenplay = Self::parse(&content, config)
            .with_context(|| format!("Failed to parse screenplay: {:?}", path))?;

        info!(
            "Parsed {} events ({} dialogue) from {:?}",
            screenplay.events.len(),
            screenplay.dialogue_count(),
            path
        );

        Ok(screenplay)
    }

    pub fn dialogue_count(&self) -> usize {
        self.events.iter().filter(|event| event.is_dialogue()).count()
    }

    /// Build the script side of the alignment from the dialogue events
    pub fn dialogue_units(&self) -> DialogueUnits {
        let mut dialogue = DialogueUnits::default();

        for (event_idx, event) in self.events.iter().enumerate() {
            if !event.is_dialogue() {
                continue;
            }
            let id = dialogue.units.len();
            dialogue
                .units
                .push(TextUnit::new(id, event.content.replace('\n', " ")));
            dialogue.event_indices.push(event_idx);
        }

        dialogue
    }

    /// Write the projected timing back onto the dialogue events
    ///
    /// `matched_text` gives the subtitle text matched to each script line, if any.
    pub fn apply_timings(
        &mut self,
        dialogue: &DialogueUnits,
        lines: &[TimedScriptLine],
        matched_text: &[Option<String>],
    ) {
        for line in lines {
            let Some(&event_idx) = dialogue.event_indices.get(line.script_idx) else {
                continue;
            };
            let Some(event) = self.events.get_mut(event_idx) else {
                continue;
            };

            event.timing = Some(EventTiming {
                subtitle: matched_text.get(line.script_idx).cloned().flatten(),
                subtitle_start: line.start_ms,
                subtitle_end: line.end_ms,
                resolution: line.resolution,
            });
        }
    }
}
