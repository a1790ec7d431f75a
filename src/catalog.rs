//! Static enrichment tables keyed by the classifier's group labels.
//!
//! The classifier predicts crop *groups*, not individual crops; these tables
//! turn a group label into the member crops and a short agronomic
//! explanation. Unknown labels degrade to an empty list / empty string, but
//! startup asserts the model's class set is covered (see `model::ModelBundle`).

// (label, member crops, explanation) — one row per group the model can emit.
const GROUPS: [(&str, &[&str], &str); 7] = [
    (
        "Major_Cereals",
        &["teff", "maize", "wheat", "barley", "sorghum"],
        "Moderate to high nitrogen with reliable rainfall favors the staple \
         cereal group grown across mid- and high-altitude zones.",
    ),
    (
        "Pulses",
        &["chickpea", "lentil", "faba bean", "field pea", "haricot bean"],
        "Lower nitrogen demand and cooler, drier conditions suit the \
         nitrogen-fixing pulse group, often rotated with cereals.",
    ),
    (
        "Oilseeds",
        &["sesame", "niger seed", "linseed", "groundnut"],
        "Warm lowland temperatures and well-drained soils with modest \
         rainfall match the oilseed group.",
    ),
    (
        "Root_Crops",
        &["enset", "potato", "sweet potato", "cassava"],
        "High soil moisture and cooler highland climates favor root and \
         tuber crops with long growing seasons.",
    ),
    (
        "Cash_Crops",
        &["coffee", "sugarcane", "cotton", "chat"],
        "High rainfall, mid-altitude bands, and slightly acidic soils are \
         typical of the perennial cash crop group.",
    ),
    (
        "Fruits",
        &["banana", "mango", "avocado", "papaya"],
        "Warm, humid conditions with steady soil moisture support the \
         fruit tree group.",
    ),
    (
        "Vegetables",
        &["onion", "tomato", "cabbage", "pepper"],
        "Balanced nutrients and controlled moisture, often under \
         irrigation, match the vegetable group.",
    ),
];

/// Member crops for a group label; empty slice if the label is unknown.
pub fn crops_for(label: &str) -> &'static [&'static str] {
    GROUPS
        .iter()
        .find(|(name, _, _)| *name == label)
        .map(|(_, crops, _)| *crops)
        .unwrap_or(&[])
}

/// Explanation text for a group label; empty string if unknown.
pub fn explanation_for(label: &str) -> &'static str {
    GROUPS
        .iter()
        .find(|(name, _, _)| *name == label)
        .map(|(_, _, text)| *text)
        .unwrap_or("")
}

/// All group labels the catalog covers, for the startup coverage check.
pub fn known_groups() -> impl Iterator<Item = &'static str> {
    GROUPS.iter().map(|(name, _, _)| *name)
}
