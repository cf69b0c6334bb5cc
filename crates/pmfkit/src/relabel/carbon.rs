//! Carbon equivalents of organic markers.

/// Species holding organic carbon without the organic markers.
pub const OC_STAR: &str = "OC*";

/// Species rebuilt by [`with_recomputed_organic_carbon`](crate::CanonicalDataset::with_recomputed_organic_carbon).
pub const OC: &str = "OC";

/// Mass fraction of carbon in each organic marker.
pub const CARBON_EQUIVALENTS: &[(&str, f64)] = &[
    ("Oxalate", 0.27),
    ("Arabitol", 0.40),
    ("Mannitol", 0.40),
    ("Sorbitol", 0.40),
    ("Polyols", 0.40),
    ("Levoglucosan", 0.44),
    ("Mannosan", 0.44),
    ("Galactosan", 0.44),
    ("MSA", 0.12),
    ("Glucose", 0.44),
    ("Cellulose", 0.44),
    ("Maleic", 0.41),
    ("Succinic", 0.41),
    ("Citraconic", 0.46),
    ("Glutaric", 0.45),
    ("Oxoheptanedioic", 0.48),
    ("MethylSuccinic", 0.53),
    ("Adipic", 0.49),
    ("Methylglutaric", 0.49),
    ("3-MBTCA", 0.47),
    ("Phtalic", 0.58),
    ("Pinic", 0.58),
    ("Suberic", 0.55),
    ("Azelaic", 0.57),
    ("Sebacic", 0.59),
];

pub fn carbon_equivalent(species: &str) -> Option<f64> {
    CARBON_EQUIVALENTS
        .iter()
        .find(|(name, _)| *name == species)
        .map(|(_, c)| *c)
}
