use std::ops::RangeInclusive;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::voices::Voice;

const RATE_RANGE: RangeInclusive<f32> = 0.1..=10.0;
const PITCH_RANGE: RangeInclusive<f32> = 0.0..=2.0;
const VOLUME_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// Settings applied to every utterance handed to the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NarrationOptions {
    /// Speech speed multiplier.
    pub rate: f32,
    pub pitch: f32,
    /// Loudness between 0 and 1.
    pub volume: f32,
    /// Explicit voice; the preferred voice is used when unset.
    pub voice: Option<Voice>,
}

impl Default for NarrationOptions {
    fn default() -> Self {
        Self {
            rate: 0.95,
            pitch: 1.05,
            volume: 1.0,
            voice: None,
        }
    }
}

/// A partial update of [`NarrationOptions`]. Fields left as `None` keep their
/// current value; `voice: Some(None)` clears the explicit voice.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct NarrationOptionsPatch {
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
    pub volume: Option<f32>,
    #[serde(with = "nullable")]
    pub voice: Option<Option<Voice>>,
}

impl NarrationOptionsPatch {
    pub fn rate(mut self, rate: f32) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn pitch(mut self, pitch: f32) -> Self {
        self.pitch = Some(pitch);
        self
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn voice(mut self, voice: Option<Voice>) -> Self {
        self.voice = Some(voice);
        self
    }
}

impl NarrationOptions {
    /// Shallow merge of `patch` into these options.
    pub fn apply(&mut self, patch: NarrationOptionsPatch) {
        if let Some(rate) = patch.rate.and_then(|rate| clamp("rate", rate, RATE_RANGE)) {
            self.rate = rate;
        }
        if let Some(pitch) = patch.pitch.and_then(|pitch| clamp("pitch", pitch, PITCH_RANGE)) {
            self.pitch = pitch;
        }
        if let Some(volume) = patch
            .volume
            .and_then(|volume| clamp("volume", volume, VOLUME_RANGE))
        {
            self.volume = volume;
        }
        if let Some(voice) = patch.voice {
            self.voice = voice;
        }
    }

    /// Clamp values loaded from configuration into the supported ranges.
    pub(crate) fn sanitised(mut self) -> Self {
        let defaults = Self::default();
        self.rate = clamp("rate", self.rate, RATE_RANGE).unwrap_or(defaults.rate);
        self.pitch = clamp("pitch", self.pitch, PITCH_RANGE).unwrap_or(defaults.pitch);
        self.volume = clamp("volume", self.volume, VOLUME_RANGE).unwrap_or(defaults.volume);
        self
    }
}

/// `None` for NaN, which leaves the field unchanged.
fn clamp(field: &str, value: f32, range: RangeInclusive<f32>) -> Option<f32> {
    if value.is_nan() {
        warn!("Ignoring NaN narration {field}");
        return None;
    }
    if range.contains(&value) {
        return Some(value);
    }
    let clamped = value.clamp(*range.start(), *range.end());
    warn!("Narration {field} {value} out of range, clamped to {clamped}");
    Some(clamped)
}

mod nullable {
    use serde::{Deserialize, Deserializer};

    use crate::voices::Voice;

    // Distinguishes a missing `voice` key from an explicit `null`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<Voice>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Voice>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_suit_storytelling() {
        let options = NarrationOptions::default();
        assert!((options.rate - 0.95).abs() < f32::EPSILON);
        assert!((options.pitch - 1.05).abs() < f32::EPSILON);
        assert!((options.volume - 1.0).abs() < f32::EPSILON);
        assert!(options.voice.is_none());
    }

    #[test]
    fn patch_keeps_unspecified_fields() {
        let mut options = NarrationOptions::default();
        options.apply(NarrationOptionsPatch::default().rate(1.2));
        assert!((options.rate - 1.2).abs() < f32::EPSILON);
        assert!((options.pitch - 1.05).abs() < f32::EPSILON);
        assert!((options.volume - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn patch_clamps_out_of_range_values() {
        let mut options = NarrationOptions::default();
        options.apply(NarrationOptionsPatch::default().volume(3.0).pitch(-1.0));
        assert!((options.volume - 1.0).abs() < f32::EPSILON);
        assert!(options.pitch.abs() < f32::EPSILON);
    }

    #[test]
    fn nan_in_patch_keeps_current_value() {
        let mut options = NarrationOptions::default();
        options.apply(NarrationOptionsPatch::default().rate(1.4));
        options.apply(NarrationOptionsPatch::default().rate(f32::NAN).volume(f32::NAN));
        assert!((options.rate - 1.4).abs() < f32::EPSILON);
        assert!((options.volume - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn sanitised_replaces_nan_with_default() {
        let options = NarrationOptions {
            pitch: f32::NAN,
            rate: 50.0,
            ..NarrationOptions::default()
        }
        .sanitised();
        assert!((options.pitch - 1.05).abs() < f32::EPSILON);
        assert!((options.rate - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn patch_can_clear_voice() {
        let mut options = NarrationOptions {
            voice: Some(Voice::new("Daniel", "en-GB")),
            ..NarrationOptions::default()
        };
        options.apply(NarrationOptionsPatch::default().rate(1.0));
        assert!(options.voice.is_some());
        options.apply(NarrationOptionsPatch::default().voice(None));
        assert!(options.voice.is_none());
    }

    #[test]
    fn patch_deserialises_null_voice_as_clear() {
        let patch: NarrationOptionsPatch = serde_json::from_str(r#"{"voice":null}"#).unwrap();
        assert_eq!(patch.voice, Some(None));
        let patch: NarrationOptionsPatch = serde_json::from_str(r#"{"rate":1.1}"#).unwrap();
        assert_eq!(patch.voice, None);
    }
}
