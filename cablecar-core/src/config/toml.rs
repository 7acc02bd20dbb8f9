//! Run configuration parser
//!
//! A minimal line parser for `run.toml`. It handles only the subset the
//! run configuration uses and needs no allocator.
//!
//! Supported:
//! - `[section]` headers: `device`, `platform`, `settle`, `sampling`
//! - `key = value` pairs (string, integer, float)
//! - Comments (`# ...`), also after a value
//!
//! Every key must be known for its section; a typo is an error, not a
//! silently ignored line. `[platform]` and `[sampling]` are required, the
//! other sections fall back to their defaults.

use core::fmt;
use core::str::FromStr;

use heapless::String;

use super::types::{DeviceVersion, DistanceUnit, RunConfig, SamplerConfig, SubWaitPolicy};
use crate::scheduler::dwell::WaitCeiling;
use crate::traits::{Direction, Note, NoteLength, Speed, Tempo};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not recognised in its section
    UnknownKey,
    /// Value could not be parsed for its key
    InvalidValue,
    /// A required section was not present
    MissingSection,
    /// Two keys that select the same setting were both given
    ConflictingKeys,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            ParseError::InvalidSection => "invalid section header",
            ParseError::UnknownKey => "unknown key",
            ParseError::InvalidValue => "invalid value",
            ParseError::MissingSection => "missing required section",
            ParseError::ConflictingKeys => "sub_waits and sub_wait_max_s are exclusive",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Device,
    Platform,
    Settle,
    Sampling,
}

/// Parse `run.toml` text into a [`SamplerConfig`]
///
/// Only syntax and value ranges of individual keys are checked here. Run
/// feasibility (dwell against the ceiling etc.) is checked when the run is
/// planned.
pub fn parse_config(input: &str) -> Result<SamplerConfig, ParseError> {
    let mut config = SamplerConfig {
        label: String::new(),
        run: RunConfig::default(),
        ceiling: WaitCeiling::REFERENCE,
    };
    let mut section = Section::Root;
    let mut seen_platform = false;
    let mut seen_sampling = false;
    let mut seen_sub_wait_policy = false;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(line)?;
            match section {
                Section::Platform => seen_platform = true,
                Section::Sampling => seen_sampling = true,
                _ => {}
            }
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        if section == Section::Sampling && matches!(key, "sub_waits" | "sub_wait_max_s") {
            if seen_sub_wait_policy {
                return Err(ParseError::ConflictingKeys);
            }
            seen_sub_wait_policy = true;
        }
        apply_value(section, key, value, &mut config)?;
    }

    if !seen_platform || !seen_sampling {
        return Err(ParseError::MissingSection);
    }

    Ok(config)
}

/// Parse a header line like `[sampling]`
fn parse_section_header(line: &str) -> Result<Section, ParseError> {
    let name = line
        .strip_prefix('[')
        .and_then(|l| l.strip_suffix(']'))
        .ok_or(ParseError::InvalidSection)?;

    match name.trim() {
        "device" => Ok(Section::Device),
        "platform" => Ok(Section::Platform),
        "settle" => Ok(Section::Settle),
        "sampling" => Ok(Section::Sampling),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Split a `key = value` line, dropping any trailing comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    let value = match value.find('#') {
        // Only a comment if the # is outside a quoted string
        Some(hash) if value[..hash].matches('"').count() % 2 == 0 => value[..hash].trim(),
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Strip quotes from a string value; bare words are accepted
fn parse_string(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_num<T: FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_version(value: &str) -> Result<DeviceVersion, ParseError> {
    match parse_string(value) {
        "1" | "v1" => Ok(DeviceVersion::V1),
        "2" | "v2" => Ok(DeviceVersion::V2),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_distance_unit(value: &str) -> Result<DistanceUnit, ParseError> {
    match parse_string(value) {
        "cm" => Ok(DistanceUnit::Centimeters),
        "inch" => Ok(DistanceUnit::Inches),
        "time" => Ok(DistanceUnit::Time),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_tempo(value: &str) -> Result<Tempo, ParseError> {
    match parse_string(value) {
        "very_slow" => Ok(Tempo::VerySlow),
        "slow" => Ok(Tempo::Slow),
        "medium" => Ok(Tempo::Medium),
        "fast" => Ok(Tempo::Fast),
        "very_fast" => Ok(Tempo::VeryFast),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_note_length(value: &str) -> Result<NoteLength, ParseError> {
    match parse_string(value) {
        "whole" => Ok(NoteLength::Whole),
        "half" => Ok(NoteLength::Half),
        "quarter" => Ok(NoteLength::Quarter),
        "eighth" => Ok(NoteLength::Eighth),
        "sixteenth" => Ok(NoteLength::Sixteenth),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_direction(value: &str) -> Result<Direction, ParseError> {
    match parse_string(value) {
        "forward" => Ok(Direction::Forward),
        "backward" => Ok(Direction::Backward),
        _ => Err(ParseError::InvalidValue),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut SamplerConfig,
) -> Result<(), ParseError> {
    let run = &mut config.run;

    match (section, key) {
        (Section::Root, "label") => {
            config.label.clear();
            config
                .label
                .push_str(parse_string(value))
                .map_err(|_| ParseError::InvalidValue)?;
        }

        (Section::Device, "version") => run.device.version = parse_version(value)?,
        (Section::Device, "distance_unit") => {
            run.device.distance_unit = parse_distance_unit(value)?
        }
        (Section::Device, "tempo") => run.device.tempo = parse_tempo(value)?,

        (Section::Platform, "wait_ceiling_s") => {
            config.ceiling =
                WaitCeiling::new(parse_num(value)?).map_err(|_| ParseError::InvalidValue)?
        }

        (Section::Settle, "cue_count") => run.settle.cue_count = parse_num(value)?,
        (Section::Settle, "cue_interval_s") => run.settle.cue_interval_s = parse_num(value)?,
        (Section::Settle, "tone") => {
            run.settle.tone =
                Note::from_str(parse_string(value)).map_err(|_| ParseError::InvalidValue)?
        }
        (Section::Settle, "tone_length") => run.settle.tone_length = parse_note_length(value)?,
        (Section::Settle, "final_wait_s") => run.settle.final_wait_s = parse_num(value)?,

        (Section::Sampling, "dwell_s") => run.dwell_s = parse_num(value)?,
        (Section::Sampling, "step_distance") => run.step_distance = parse_num(value)?,
        (Section::Sampling, "step_count") => run.step_count = parse_num(value)?,
        (Section::Sampling, "speed") => {
            run.speed = Speed::new(parse_num(value)?).map_err(|_| ParseError::InvalidValue)?
        }
        (Section::Sampling, "direction") => run.sampling_direction = parse_direction(value)?,
        (Section::Sampling, "sub_waits") => {
            run.sub_wait_policy = SubWaitPolicy::FixedCount(parse_num(value)?)
        }
        (Section::Sampling, "sub_wait_max_s") => {
            run.sub_wait_policy = SubWaitPolicy::MaxLength(parse_num(value)?)
        }

        _ => return Err(ParseError::UnknownKey),
    }

    Ok(())
}
