//! Canonical source categories for factor names found in the field.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

static SOURCE_CATEGORIES: Lazy<IndexMap<&'static str, &'static str>> = Lazy::new(|| {
    IndexMap::from_iter([
        // Traffic
        ("Vehicular", "Traffic"),
        ("VEH", "Traffic"),
        ("VEH ind", "Traffic_ind"),
        ("VEH dir", "Traffic_dir"),
        ("Traffic_exhaust", "Traffic_exhaust"),
        ("Traffic_non-exhaust", "Traffic_non-exhaust"),
        ("Oil/Vehicular", "Traffic"),
        ("Road traffic/oil combustion", "Traffic"),
        ("Traffic", "Road traffic"),
        ("Traffic 1", "Traffic 1"),
        ("Traffic 2", "Traffic 2"),
        ("Primary traffic", "Road traffic"),
        ("Road traffic", "Road traffic"),
        ("Road trafic", "Road traffic"),
        ("Road traffic/dust", "Traffic/dust (Mix)"),
        ("Oil", "Oil"),
        ("Vanadium rich", "Vanadium rich"),
        // Biomass burning
        ("Bio. burning", "Biomass_burning"),
        ("Bio burning", "Biomass_burning"),
        ("Comb fossile/biomasse", "Biomass_burning"),
        ("BB", "Biomass_burning"),
        ("Biomass_burning", "Biomass_burning"),
        ("Biomass Burning", "Biomass_burning"),
        ("Biomass burning", "Biomass_burning"),
        ("BB1", "Biomass_burning1"),
        ("BB2", "Biomass_burning2"),
        // Secondary
        ("Sulfate-rich", "Sulfate_rich"),
        ("Sulphate-rich", "Sulfate_rich"),
        ("Sulfate rich", "Sulfate_rich"),
        ("Sulfate_rich", "Sulfate_rich"),
        ("Nitrate-rich", "Nitrate_rich"),
        ("Nitrate rich", "Nitrate_rich"),
        ("Nitrate_rich", "Nitrate_rich"),
        ("Secondary inorganics", "Secondary_inorganics"),
        ("Secondaire", "MSA_rich"),
        ("Secondary bio", "MSA_rich"),
        ("Secondary biogenic", "MSA_rich"),
        ("Secondary organic", "MSA_rich"),
        ("Secondary oxidation", "Secondary_oxidation"),
        ("Secondary biogenic oxidation", "Secondary_biogenic_oxidation"),
        ("Secondaire organique", "MSA_rich"),
        ("Marine SOA", "MSA_rich"),
        ("MSA_rich", "MSA_rich"),
        ("MSA-rich", "MSA-rich"),
        ("MSA rich", "MSA_rich"),
        ("Marine secondary", "MSA_rich"),
        ("Marin secondaire", "MSA_rich"),
        ("Marin", "MSA_rich"),
        ("Secondary biogenic/sulfate", "SOA/sulfate (Mix)"),
        ("Marine SOA/SO4", "SOA/sulfate (Mix)"),
        // Marine and heavy fuel oil
        ("Marine/HFO", "Marine/HFO"),
        ("Marine biogenic/HFO", "Marine/HFO"),
        ("Secondary biogenic/HFO", "Marine/HFO"),
        ("Marine bio/HFO", "Marine/HFO"),
        ("Marin bio/HFO", "Marine/HFO"),
        ("Sulfate rich/HFO", "Marine/HFO"),
        ("HFO", "HFO"),
        ("HFO (stainless)", "HFO"),
        ("Fioul lourd", "HFO"),
        // Salt
        ("Sea/road salt", "Sea-road salt"),
        ("Sea-road salt", "Sea-road salt"),
        ("sea-road salt", "Sea-road salt"),
        ("Road salt", "Salt"),
        ("Sea salt", "Salt"),
        ("Seasalt", "Salt"),
        ("Salt", "Salt"),
        ("Fresh seasalt", "Salt"),
        ("Sels de mer", "Salt"),
        ("Aged_salt", "Aged_salt"),
        ("Aged sea salt", "Aged_salt"),
        ("Aged seasalt", "Aged_salt"),
        ("Aged salt", "Aged_salt"),
        // Primary biogenic
        ("Primary_biogenic", "Primary_biogenic"),
        ("Primary bio", "Primary_biogenic"),
        ("Primary biogenic", "Primary_biogenic"),
        ("Biogénique primaire", "Primary_biogenic"),
        ("Biogenique", "Primary_biogenic"),
        ("Biogenic", "Primary_biogenic"),
        ("Débris végétaux", "Plant_debris"),
        // Dust
        ("Mineral dust", "Dust"),
        ("Resuspended_dust", "Resuspended_dust"),
        ("Resuspended dust", "Resuspended_dust"),
        ("Dust", "Dust"),
        ("Crustal dust", "Dust"),
        ("Dust (mineral)", "Dust"),
        ("Dust/biogénique marin", "Dust"),
        ("AOS/dust", "Dust"),
        // Industry
        ("Industrial", "Industrial"),
        ("Industry", "Industrial"),
        ("Industrie", "Industrial"),
        ("Industries", "Industrial"),
        ("Arcellor", "Industrial"),
        ("Siderurgie", "Industrial"),
        ("Industry/vehicular", "Industry/traffic"),
        ("Industry/traffic", "Industry/traffic"),
        ("Industries/trafic", "Industry/traffic"),
        ("Cadmium rich", "Cadmium rich"),
        // Other
        ("Chlorure", "Chloride"),
        ("PM other", "Other"),
        ("Undetermined", "Undetermined"),
    ])
});

/// Canonical category of a factor name, if known.
///
/// Surrounding whitespace is ignored.
///
/// # Example
///
/// ```
/// use pmfkit::relabel::source_category;
///
/// assert_eq!(source_category("Bio. burning"), Some("Biomass_burning"));
/// assert_eq!(source_category("Sulphate-rich"), Some("Sulfate_rich"));
/// assert_eq!(source_category("Factor 7"), None);
/// ```
pub fn source_category(name: &str) -> Option<&'static str> {
    SOURCE_CATEGORIES.get(name.trim()).copied()
}

/// Every known factor name and its category, in table order.
pub fn source_categories() -> impl Iterator<Item = (&'static str, &'static str)> {
    SOURCE_CATEGORIES.iter().map(|(k, v)| (*k, *v))
}
