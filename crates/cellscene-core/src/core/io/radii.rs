use phf::phf_map;

/// Radius used for elements missing from the table.
pub const DEFAULT_RADIUS: f64 = 1.70;

/// Van der Waals radii (Angstroms) keyed by upper-case element symbol.
static VDW_RADII: phf::Map<&'static str, f64> = phf_map! {
    "H" => 1.20,
    "C" => 1.70,
    "N" => 1.55,
    "O" => 1.52,
    "S" => 1.80,
    "P" => 1.80,
    "F" => 1.47,
    "CL" => 1.75,
    "BR" => 1.85,
    "I" => 1.98,
    "SE" => 1.90,
    "NA" => 2.27,
    "K" => 2.75,
    "MG" => 1.73,
    "CA" => 2.31,
    "MN" => 1.97,
    "FE" => 1.94,
    "CO" => 1.92,
    "NI" => 1.63,
    "CU" => 1.40,
    "ZN" => 1.39,
};

/// Looks up the radius for an element symbol, case-insensitively.
pub fn vdw_radius(element: &str) -> f64 {
    VDW_RADII
        .get(element.trim().to_ascii_uppercase().as_str())
        .copied()
        .unwrap_or(DEFAULT_RADIUS)
}

/// Guesses the element of an atom from its name when the element column is
/// blank: the first alphabetic character (e.g. `CA` -> `C`, `1HB` -> `H`).
pub fn element_from_atom_name(name: &str) -> String {
    name.chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}
