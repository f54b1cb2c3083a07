//! Known Age of Sigmar factions and name/faction splitting.

use rapidfuzz::distance::jaro_winkler;
use std::collections::HashMap;

use crate::error::ParseErrorKind;

/// Factions as they appear in pasted pairing text
const KNOWN_FACTIONS: &[&str] = &[
    "Soulblight Gravelords",
    "Stormcast Eternals",
    "Ossiarch Bonereapers",
    "Disciples Of Tzeentch",
    "Slaves To Darkness",
    "Flesh Eater Courts",
    "Maggotkin Of Nurgle",
    "Lumineth Realm Lords",
    "Cities Of Sigmar",
    "Beasts Of Chaos",
    "Sylvaneth",
    "Seraphon",
    "Skaven",
    "Kruleboyz",
    "Sons Of Behemat",
    "Daughters Of Khaine",
    "Hedonites Of Slaanesh",
    "Blades Of Khorne",
    "Fyreslayers",
    "Kharadron Overlords",
    "Gloomspite Gitz",
    "Ogor Mawtribes",
    "Idoneth Deepkin",
    "Nighthaunt",
    "Ironjawz",
    "Ironjaws",
    "Orruk Warclans",
];

/// Pasted casing -> display casing
const CORRECTIONS: &[(&str, &str)] = &[
    ("Beasts Of Chaos", "Beasts of Chaos"),
    ("Blades Of Khorne", "Blades of Khorne"),
    ("Disciples Of Tzeentch", "Disciples of Tzeentch"),
    ("Hedonites Of Slaanesh", "Hedonites of Slaanesh"),
    ("Maggotkin Of Nurgle", "Maggotkin of Nurgle"),
    ("Slaves To Darkness", "Slaves to Darkness"),
    ("Flesh Eater Courts", "Flesh-eater Courts"),
    ("Sons Of Behemat", "Sons of Behemat"),
    ("Cities Of Sigmar", "Cities of Sigmar"),
    ("Daughters Of Khaine", "Daughters of Khaine"),
    ("Lumineth Realm Lords", "Lumineth Realm-Lords"),
    ("Ironjaws", "Ironjawz"),
];

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Faction lookup ordered longest name first, so a suffix search always
/// prefers the most specific faction.
#[derive(Debug, Clone)]
pub struct FactionCatalog {
    factions: Vec<String>,
    corrections: HashMap<String, String>,
}

impl Default for FactionCatalog {
    fn default() -> Self {
        Self::new(
            KNOWN_FACTIONS.iter().copied(),
            CORRECTIONS.iter().copied(),
        )
    }
}

impl FactionCatalog {
    pub fn new<F, C, K, V>(factions: F, corrections: C) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        C: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for faction in factions.into_iter().map(Into::into) {
            if !unique.contains(&faction) {
                unique.push(faction);
            }
        }
        // Stable, so equal-length names keep their listed order
        unique.sort_by(|a, b| b.len().cmp(&a.len()));

        Self {
            factions: unique,
            corrections: corrections
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Factions, longest first
    pub fn factions(&self) -> &[String] {
        &self.factions
    }

    /// Display casing for a parsed faction name; unknown names pass through
    pub fn canonicalize(&self, raw_faction: &str) -> String {
        let raw = raw_faction.trim();
        self.corrections
            .get(raw)
            .cloned()
            .unwrap_or_else(|| raw.to_string())
    }

    /// Split `"<player name> <faction>"` on the longest catalog faction that
    /// ends the string (ASCII case-insensitive).
    ///
    /// Returns the trimmed name and the catalog spelling of the faction.
    pub fn split_name_and_faction(&self, raw: &str) -> Result<(String, String), ParseErrorKind> {
        let raw = raw.trim();

        for faction in &self.factions {
            if raw.len() < faction.len() {
                continue;
            }
            let split = raw.len() - faction.len();
            if !raw.is_char_boundary(split) || !raw[split..].eq_ignore_ascii_case(faction) {
                continue;
            }

            let name = raw[..split].trim();
            if name.is_empty() {
                return Err(ParseErrorKind::MissingPlayerName {
                    raw: raw.to_string(),
                });
            }
            return Ok((name.to_string(), faction.clone()));
        }

        Err(ParseErrorKind::UnknownFaction {
            raw: raw.to_string(),
            suggestion: self.suggest(raw).map(str::to_string),
        })
    }

    /// Closest faction to the tail of `raw`, if any is reasonably close
    pub fn suggest(&self, raw: &str) -> Option<&str> {
        let words: Vec<String> = raw.split_whitespace().map(str::to_lowercase).collect();

        let mut best: Option<(&str, f64)> = None;
        for faction in &self.factions {
            let faction_lower = faction.to_lowercase();
            let width = faction_lower.split_whitespace().count();
            if width == 0 || words.len() < width {
                continue;
            }
            let tail = words[words.len() - width..].join(" ");

            let score = jaro_winkler::normalized_similarity(tail.chars(), faction_lower.chars());
            if score >= SUGGESTION_THRESHOLD && best.map_or(true, |(_, s)| score > s) {
                best = Some((faction.as_str(), score));
            }
        }

        best.map(|(faction, _)| faction)
    }

    /// Whether `faction` is a catalog name or a corrected display name
    pub fn is_known(&self, faction: &str) -> bool {
        let faction = faction.trim();
        self.factions.iter().any(|f| f.eq_ignore_ascii_case(faction))
            || self.corrections.values().any(|f| f.eq_ignore_ascii_case(faction))
    }
}
