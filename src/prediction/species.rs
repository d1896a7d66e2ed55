//! Static descriptions of the iris species the classifier can return.

use std::borrow::Cow;

/// Accent color used when presenting a species.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeciesColor {
    Emerald,
    Blue,
    Purple,
    /// Used for labels without a known profile.
    Neutral,
}

/// Display metadata for a predicted species label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeciesProfile {
    pub name: Cow<'static, str>,
    pub description: &'static str,
    pub color: SpeciesColor,
    pub characteristics: &'static [&'static str],
}

impl SpeciesProfile {
    /// True when the label matched an entry of the species table.
    pub fn is_known(&self) -> bool {
        self.color != SpeciesColor::Neutral
    }
}

struct SpeciesEntry {
    key: &'static str,
    name: &'static str,
    description: &'static str,
    color: SpeciesColor,
    characteristics: &'static [&'static str],
}

const SPECIES: &[SpeciesEntry] = &[
    SpeciesEntry {
        key: "setosa",
        name: "Iris Setosa",
        description: "Known for its small petals and robust sepals. Native to Alaska, Canada, and the northern United States.",
        color: SpeciesColor::Emerald,
        characteristics: &[
            "Small petals",
            "Wide sepals",
            "Hardy species",
            "Cold climate adapted",
        ],
    },
    SpeciesEntry {
        key: "versicolor",
        name: "Iris Versicolor",
        description: "Features medium-sized petals with moderate proportions. Also known as the Blue Flag iris.",
        color: SpeciesColor::Blue,
        characteristics: &[
            "Medium petals",
            "Balanced proportions",
            "Purple-blue flowers",
            "Wetland species",
        ],
    },
    SpeciesEntry {
        key: "virginica",
        name: "Iris Virginica",
        description: "Distinguished by large petals and elongated features. The largest of the three iris species.",
        color: SpeciesColor::Purple,
        characteristics: &[
            "Large petals",
            "Long sepals",
            "Tall growth",
            "Late blooming",
        ],
    },
];

const UNKNOWN_DESCRIPTION: &str = "Unknown species";

/// Look up the profile for a species label, falling back to a neutral profile
/// named after the raw label when it is not in the table.
pub fn resolve(label: &str) -> SpeciesProfile {
    let key = label.trim().to_lowercase();
    SPECIES
        .iter()
        .find(|entry| entry.key == key)
        .map(|entry| SpeciesProfile {
            name: Cow::Borrowed(entry.name),
            description: entry.description,
            color: entry.color,
            characteristics: entry.characteristics,
        })
        .unwrap_or_else(|| SpeciesProfile {
            name: Cow::Owned(label.to_string()),
            description: UNKNOWN_DESCRIPTION,
            color: SpeciesColor::Neutral,
            characteristics: &[],
        })
}
