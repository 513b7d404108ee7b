//! Embedded micronutrient data.
//!
//! Every variant draws on the same twenty nutrients. They differ in how much
//! each edge carries (plain relation or relation plus strength) and whether
//! nutrients are grouped by biological function.

use crate::ir::{Group, Interaction, Relation, Strength};
use crate::ir::Relation::{Boosts, Inhibits};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CALCIUM: &str = "Calcium (Ca)";
const MAGNESIUM: &str = "Magnesium (Mg)";
const IRON: &str = "Iron (Fe)";
const ZINC: &str = "Zinc (Zn)";
const COPPER: &str = "Copper (Cu)";
const MANGANESE: &str = "Manganese (Mn)";
const SELENIUM: &str = "Selenium (Se)";
const IODINE: &str = "Iodine (I)";
const CHROMIUM: &str = "Chromium (Cr)";
const MOLYBDENUM: &str = "Molybdenum (Mo)";
const SODIUM: &str = "Sodium (Na)";
const POTASSIUM: &str = "Potassium (K)";
const PHOSPHORUS: &str = "Phosphorus (P)";
const BORON: &str = "Boron (B)";
const SILICON: &str = "Silicon (Si)";
const FLUORIDE: &str = "Fluoride (F)";
const VANADIUM: &str = "Vanadium (V)";
const NICKEL: &str = "Nickel (Ni)";
const COBALT: &str = "Cobalt (Co)";
const LITHIUM: &str = "Lithium (Li)";

const NUTRIENTS: [&str; 20] = [
    CALCIUM, MAGNESIUM, IRON, ZINC, COPPER, MANGANESE, SELENIUM, IODINE, CHROMIUM, MOLYBDENUM,
    SODIUM, POTASSIUM, PHOSPHORUS, BORON, SILICON, FLUORIDE, VANADIUM, NICKEL, COBALT, LITHIUM,
];

/// The first sixteen entries form the reduced dataset.
const EDGES: [(&str, &str, Relation); 24] = [
    (CALCIUM, IRON, Inhibits),
    (CALCIUM, MAGNESIUM, Inhibits),
    (MAGNESIUM, CALCIUM, Boosts),
    (ZINC, COPPER, Inhibits),
    (ZINC, IRON, Inhibits),
    (IRON, ZINC, Inhibits),
    (MANGANESE, IRON, Inhibits),
    (MOLYBDENUM, COPPER, Inhibits),
    (SELENIUM, IODINE, Boosts),
    (IRON, IODINE, Boosts),
    (CHROMIUM, IRON, Inhibits),
    (PHOSPHORUS, CALCIUM, Inhibits),
    (SODIUM, POTASSIUM, Inhibits),
    (POTASSIUM, SODIUM, Inhibits),
    (SODIUM, CALCIUM, Inhibits),
    (POTASSIUM, CALCIUM, Boosts),
    (BORON, CALCIUM, Boosts),
    (BORON, MAGNESIUM, Boosts),
    (SILICON, CALCIUM, Boosts),
    (FLUORIDE, CALCIUM, Inhibits),
    (VANADIUM, IRON, Inhibits),
    (NICKEL, ZINC, Inhibits),
    (COBALT, IRON, Inhibits),
    (LITHIUM, IODINE, Inhibits),
];

const REDUCED_EDGE_COUNT: usize = 16;

const WEIGHTED_EDGES: [(&str, &str, Relation, Strength); 24] = [
    (CALCIUM, IRON, Inhibits, Strength::High),
    (CALCIUM, MAGNESIUM, Inhibits, Strength::Medium),
    (MAGNESIUM, CALCIUM, Boosts, Strength::High),
    (ZINC, COPPER, Inhibits, Strength::High),
    (ZINC, IRON, Inhibits, Strength::Medium),
    (IRON, ZINC, Inhibits, Strength::Medium),
    (NICKEL, ZINC, Inhibits, Strength::Low),
    (MANGANESE, IRON, Inhibits, Strength::Medium),
    (CHROMIUM, IRON, Inhibits, Strength::Low),
    (VANADIUM, IRON, Inhibits, Strength::Low),
    (COBALT, IRON, Inhibits, Strength::Medium),
    (MOLYBDENUM, COPPER, Inhibits, Strength::High),
    (SELENIUM, IODINE, Boosts, Strength::High),
    (IRON, IODINE, Boosts, Strength::Medium),
    (LITHIUM, IODINE, Inhibits, Strength::Low),
    (SODIUM, POTASSIUM, Inhibits, Strength::High),
    (POTASSIUM, SODIUM, Inhibits, Strength::High),
    (SODIUM, CALCIUM, Inhibits, Strength::Medium),
    (POTASSIUM, CALCIUM, Boosts, Strength::Medium),
    (BORON, CALCIUM, Boosts, Strength::Medium),
    (BORON, MAGNESIUM, Boosts, Strength::Medium),
    (SILICON, CALCIUM, Boosts, Strength::Medium),
    (PHOSPHORUS, CALCIUM, Inhibits, Strength::Medium),
    (FLUORIDE, CALCIUM, Inhibits, Strength::Low),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Variant {
    Reduced,
    Elements,
    Coloured,
    #[default]
    Enhanced,
}

/// How much an interaction carries beyond its relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Richness {
    Plain,
    Weighted,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Reduced,
        Variant::Elements,
        Variant::Coloured,
        Variant::Enhanced,
    ];

    pub fn richness(self) -> Richness {
        match self {
            Variant::Enhanced => Richness::Weighted,
            _ => Richness::Plain,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Reduced => "reduced",
            Variant::Elements => "elements",
            Variant::Coloured => "coloured",
            Variant::Enhanced => "enhanced",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub variant: Variant,
    pub title: String,
    /// Explicit node list; empty when nodes come from `groups`.
    pub nutrients: Vec<String>,
    pub groups: Vec<Group>,
    pub interactions: Vec<Interaction>,
    pub output_path: PathBuf,
}

impl Dataset {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Reduced => Self::reduced(),
            Variant::Elements => Self::elements(),
            Variant::Coloured => Self::coloured(),
            Variant::Enhanced => Self::enhanced(),
        }
    }

    pub fn reduced() -> Self {
        Self {
            variant: Variant::Reduced,
            title: "Micronutrient Interaction Network".to_string(),
            nutrients: flat_nutrients(),
            groups: Vec::new(),
            interactions: plain_interactions(REDUCED_EDGE_COUNT),
            output_path: PathBuf::from(".github/resources/micronutrient_network.png"),
        }
    }

    pub fn elements() -> Self {
        Self {
            variant: Variant::Elements,
            title: "Comprehensive Micronutrient Interaction Network".to_string(),
            nutrients: flat_nutrients(),
            groups: Vec::new(),
            interactions: plain_interactions(EDGES.len()),
            output_path: PathBuf::from(".github/resources/micronutrient_network_elements.png"),
        }
    }

    pub fn coloured() -> Self {
        Self {
            variant: Variant::Coloured,
            title: "Micronutrient Interaction Network (Grouped by Biological Role)".to_string(),
            nutrients: Vec::new(),
            groups: vec![
                Group::new("Electrolytes", &[SODIUM, POTASSIUM, PHOSPHORUS]),
                Group::new("Bone/Structure", &[CALCIUM, MAGNESIUM, FLUORIDE, SILICON, BORON]),
                Group::new("Blood & Oxygen", &[IRON, COBALT, COPPER]),
                Group::new(
                    "Enzyme Cofactors",
                    &[ZINC, MANGANESE, CHROMIUM, MOLYBDENUM, NICKEL, VANADIUM],
                ),
                Group::new("Thyroid & Hormones", &[IODINE, SELENIUM, LITHIUM]),
            ],
            interactions: plain_interactions(EDGES.len()),
            output_path: PathBuf::from(".github/resources/micronutrient_network_coloured.png"),
        }
    }

    pub fn enhanced() -> Self {
        Self {
            variant: Variant::Enhanced,
            title: "Micronutrient Interaction Network\n(Grouped by Biological Function)"
                .to_string(),
            nutrients: Vec::new(),
            groups: vec![
                Group::new(
                    "Electrolytes & Fluid Balance",
                    &[SODIUM, POTASSIUM, PHOSPHORUS],
                ),
                Group::new(
                    "Bone Health & Structure",
                    &[CALCIUM, MAGNESIUM, FLUORIDE, SILICON, BORON],
                ),
                Group::new(
                    "Blood Formation & Oxygen Transport",
                    &[IRON, COBALT, COPPER],
                ),
                Group::new(
                    "Enzymatic Cofactors",
                    &[ZINC, MANGANESE, CHROMIUM, MOLYBDENUM, NICKEL, VANADIUM],
                ),
                Group::new("Endocrine & Metabolic", &[IODINE, SELENIUM, LITHIUM]),
            ],
            interactions: WEIGHTED_EDGES
                .iter()
                .map(|(from, to, relation, strength)| {
                    Interaction::new(from, to, *relation).with_strength(*strength)
                })
                .collect(),
            output_path: PathBuf::from("images/micronutrient_network_enhanced.png"),
        }
    }

    pub fn richness(&self) -> Richness {
        self.variant.richness()
    }

    /// Node ids with their group, in declaration order: the explicit list,
    /// or group members flattened in group order.
    pub fn nutrients(&self) -> Vec<(&str, Option<&str>)> {
        if self.groups.is_empty() {
            return self.nutrients.iter().map(|id| (id.as_str(), None)).collect();
        }
        self.groups
            .iter()
            .flat_map(|group| {
                group
                    .members
                    .iter()
                    .map(|member| (member.as_str(), Some(group.name.as_str())))
            })
            .collect()
    }
}

fn flat_nutrients() -> Vec<String> {
    NUTRIENTS.iter().map(|n| n.to_string()).collect()
}

fn plain_interactions(count: usize) -> Vec<Interaction> {
    EDGES
        .iter()
        .take(count)
        .map(|(from, to, relation)| Interaction::new(from, to, *relation))
        .collect()
}
