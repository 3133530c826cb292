use serde::{Deserialize, Serialize};

/// Voice names tried in order when choosing the narrator's voice.
pub const DEFAULT_PREFERRED_VOICES: &[&str] = &[
    "Microsoft David",
    "Google UK English Male",
    "Daniel",
    "James",
    "Microsoft Samantha",
    "Google US English",
];

const ENGLISH_TAG: &str = "en";

/// A voice exposed by the speech engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }

    fn is_english(&self) -> bool {
        self.lang.contains(ENGLISH_TAG)
    }
}

/// Pick the narrator voice from `voices`.
///
/// Ranked names win in rank order, but only for English voices. Without a
/// ranked match the first English voice is used, then the first voice of any
/// language. Returns `None` only for an empty list.
pub fn select_preferred<S: AsRef<str>>(voices: &[Voice], ranked: &[S]) -> Option<Voice> {
    ranked
        .iter()
        .find_map(|token| {
            voices
                .iter()
                .find(|voice| voice.name.contains(token.as_ref()) && voice.is_english())
        })
        .or_else(|| voices.iter().find(|voice| voice.is_english()))
        .or_else(|| voices.first())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Voice> {
        vec![
            Voice::new("Amélie", "fr-CA"),
            Voice::new("Google US English", "en-US"),
            Voice::new("Daniel", "en-GB"),
            Voice::new("Microsoft David Desktop", "en-US"),
        ]
    }

    #[test]
    fn ranked_name_beats_lower_ranked_english_voice() {
        let voice = select_preferred(&catalog(), DEFAULT_PREFERRED_VOICES).unwrap();
        assert_eq!(voice.name, "Microsoft David Desktop");
    }

    #[test]
    fn ranked_name_requires_english_tag() {
        let voices = vec![Voice::new("Daniel", "de-DE"), Voice::new("Karen", "en-AU")];
        let voice = select_preferred(&voices, DEFAULT_PREFERRED_VOICES).unwrap();
        assert_eq!(voice.name, "Karen");
    }

    #[test]
    fn falls_back_to_first_voice_of_any_language() {
        let voices = vec![Voice::new("Amélie", "fr-CA"), Voice::new("Anna", "de-DE")];
        let voice = select_preferred(&voices, DEFAULT_PREFERRED_VOICES).unwrap();
        assert_eq!(voice.name, "Amélie");
    }

    #[test]
    fn empty_catalog_selects_nothing() {
        assert!(select_preferred::<&str>(&[], DEFAULT_PREFERRED_VOICES).is_none());
    }

    #[test]
    fn custom_ranking_is_honoured() {
        let voice = select_preferred(&catalog(), &["Daniel".to_string()]).unwrap();
        assert_eq!(voice.name, "Daniel");
    }
}
