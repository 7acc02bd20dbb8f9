//! Audible signal types
//!
//! Notes, note lengths and tempo used by the tone/beep cues.

use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest supported octave
pub const MAX_OCTAVE: u8 = 8;

/// Pitch class within an octave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Pitch {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

/// Equal-tempered frequencies of octave 8 in millihertz, indexed by pitch
const OCTAVE_8_MILLIHZ: [u32; 12] = [
    4_186_009, 4_434_922, 4_698_636, 4_978_032, 5_274_041, 5_587_652, 5_919_911, 6_271_927,
    6_644_875, 7_040_000, 7_458_620, 7_902_133,
];

/// A musical note (pitch + octave)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Note {
    pitch: Pitch,
    octave: u8,
}

impl Note {
    /// A7, the cue tone that ends the settle countdown by default
    pub const A7: Note = Note {
        pitch: Pitch::A,
        octave: 7,
    };

    /// Create a note; `None` if the octave is above [`MAX_OCTAVE`]
    pub const fn new(pitch: Pitch, octave: u8) -> Option<Self> {
        if octave > MAX_OCTAVE {
            None
        } else {
            Some(Self { pitch, octave })
        }
    }

    pub const fn pitch(self) -> Pitch {
        self.pitch
    }

    pub const fn octave(self) -> u8 {
        self.octave
    }

    /// Frequency in millihertz
    pub const fn frequency_millihz(self) -> u32 {
        OCTAVE_8_MILLIHZ[self.pitch as usize] >> (MAX_OCTAVE - self.octave)
    }

    /// Frequency rounded to whole hertz
    pub const fn frequency_hz(self) -> u32 {
        (self.frequency_millihz() + 500) / 1000
    }
}

/// Error returned when a note name cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidNote;

impl FromStr for Note {
    type Err = InvalidNote;

    /// Parse names like `A7`, `C#6` or `f#5`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let letter = chars.next().ok_or(InvalidNote)?;
        let rest = chars.as_str();
        let (sharp, octave) = match rest.strip_prefix('#') {
            Some(octave) => (true, octave),
            None => (false, rest),
        };

        let pitch = match (letter.to_ascii_uppercase(), sharp) {
            ('C', false) => Pitch::C,
            ('C', true) => Pitch::CSharp,
            ('D', false) => Pitch::D,
            ('D', true) => Pitch::DSharp,
            ('E', false) => Pitch::E,
            ('F', false) => Pitch::F,
            ('F', true) => Pitch::FSharp,
            ('G', false) => Pitch::G,
            ('G', true) => Pitch::GSharp,
            ('A', false) => Pitch::A,
            ('A', true) => Pitch::ASharp,
            ('B', false) => Pitch::B,
            _ => return Err(InvalidNote),
        };

        let octave: u8 = octave.parse().map_err(|_| InvalidNote)?;
        Note::new(pitch, octave).ok_or(InvalidNote)
    }
}

/// Playback tempo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Tempo {
    VerySlow,
    Slow,
    #[default]
    Medium,
    Fast,
    VeryFast,
}

impl Tempo {
    /// Length of a quarter note in milliseconds
    pub const fn quarter_ms(self) -> u32 {
        match self {
            Tempo::VerySlow => 1000,
            Tempo::Slow => 750,
            Tempo::Medium => 500,
            Tempo::Fast => 375,
            Tempo::VeryFast => 250,
        }
    }
}

/// Note length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NoteLength {
    Whole,
    #[default]
    Half,
    Quarter,
    Eighth,
    Sixteenth,
}

impl NoteLength {
    /// Duration of this note at the given tempo
    pub const fn millis(self, tempo: Tempo) -> u32 {
        let quarter = tempo.quarter_ms();
        match self {
            NoteLength::Whole => quarter * 4,
            NoteLength::Half => quarter * 2,
            NoteLength::Quarter => quarter,
            NoteLength::Eighth => quarter / 2,
            NoteLength::Sixteenth => quarter / 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a7_frequency() {
        assert_eq!(Note::A7.frequency_hz(), 3520);
        let a4 = Note::new(Pitch::A, 4).unwrap();
        assert_eq!(a4.frequency_hz(), 440);
    }

    #[test]
    fn test_parse_note() {
        assert_eq!("A7".parse::<Note>(), Ok(Note::A7));
        assert_eq!(
            "c#6".parse::<Note>(),
            Ok(Note::new(Pitch::CSharp, 6).unwrap())
        );
        assert_eq!("E#4".parse::<Note>(), Err(InvalidNote));
        assert_eq!("A9".parse::<Note>(), Err(InvalidNote));
        assert_eq!("".parse::<Note>(), Err(InvalidNote));
    }

    #[test]
    fn test_note_length() {
        assert_eq!(NoteLength::Half.millis(Tempo::Medium), 1000);
        assert_eq!(NoteLength::Sixteenth.millis(Tempo::VeryFast), 62);
        assert_eq!(NoteLength::Whole.millis(Tempo::VerySlow), 4000);
    }
}
