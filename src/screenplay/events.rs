/*!
 * Conversion of classified blocks into screenplay events.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::layout::{Block, BlockAlignment};
use super::{EventKind, ScriptEvent};

static VOICE_MODIFIER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((.*?)\)").unwrap());

/// Turn blocks into events and merge adjacent metadata and camera actions
pub fn parse_blocks(blocks: &[Block]) -> Vec<ScriptEvent> {
    let events = blocks.iter().flat_map(|block| match block.alignment {
        BlockAlignment::Center | BlockAlignment::DualCenter => parse_center_block(&block.lines),
        BlockAlignment::Left => vec![parse_left_block(&block.lines)],
        BlockAlignment::Right => vec![parse_right_block(&block.lines)],
    });

    let mut merged: Vec<ScriptEvent> = Vec::new();
    for event in events {
        match merged.last_mut() {
            Some(last)
                if last.kind == event.kind
                    && matches!(event.kind, EventKind::Metadata | EventKind::CameraAction) =>
            {
                last.content.push(' ');
                last.content.push_str(&event.content);
            }
            _ => merged.push(event),
        }
    }

    merged
}

/// Character cue followed by dialogue, or centered metadata
fn parse_center_block(lines: &[String]) -> Vec<ScriptEvent> {
    let Some(cue) = lines.first().filter(|cue| lines.len() > 1 && is_upper(cue)) else {
        return vec![ScriptEvent::new(EventKind::Metadata, lines.join(" "))];
    };

    let voice_modifiers: Vec<String> = VOICE_MODIFIER_REGEX
        .captures_iter(cue)
        .map(|caps| caps[1].to_string())
        .collect();
    let speaker = VOICE_MODIFIER_REGEX.replace_all(cue, "").trim().to_string();

    let dialogue = |content: &[&str], action: &Option<String>| {
        let mut event = ScriptEvent::new(EventKind::Dialogue, content.join(" "));
        event.speaker = Some(speaker.clone());
        event.voice_modifiers = voice_modifiers.clone();
        event.dialogue_action = action.clone();
        event
    };

    let mut events = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    let mut action: Option<String> = None;

    for line in &lines[1..] {
        let line = line.trim();
        // Parentheticals split the speech and describe what follows
        if let Some(inner) = line.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
            if !pending.is_empty() {
                events.push(dialogue(&pending, &action));
                pending.clear();
            }
            action = Some(inner.to_string());
        } else {
            pending.push(line);
        }
    }
    if !pending.is_empty() {
        events.push(dialogue(&pending, &action));
    }

    events
}

fn parse_left_block(lines: &[String]) -> ScriptEvent {
    let content = lines.join(" ");
    let first = lines.first().map(String::as_str).unwrap_or_default();

    let kind = if !has_lowercase(first) {
        if first.contains("EXT") || first.contains("INT") {
            EventKind::Setting
        } else {
            EventKind::CameraAction
        }
    } else {
        EventKind::Description
    };

    ScriptEvent::new(kind, content)
}

fn parse_right_block(lines: &[String]) -> ScriptEvent {
    let first = lines.first().map(String::as_str).unwrap_or_default();
    let kind = if is_upper(first) {
        EventKind::CameraAction
    } else {
        EventKind::Metadata
    };

    ScriptEvent::new(kind, lines.join(" "))
}

/// At least one uppercase letter and no lowercase ones
fn is_upper(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !has_lowercase(text)
}

fn has_lowercase(text: &str) -> bool {
    text.chars().any(char::is_lowercase)
}
