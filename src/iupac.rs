use phf::phf_map;

/// IUPAC nucleotide ambiguity codes keyed by the sorted, gap-free set of
/// observed bases. Single bases map to themselves in upper case; every
/// ambiguous set maps to a lower-case code so degenerate positions stay
/// visible in a primer.
pub static IUPAC_CODES: phf::Map<&'static str, char> = phf_map! {
    "A" => 'A',
    "C" => 'C',
    "G" => 'G',
    "T" => 'T',
    "AT" => 'w',
    "CG" => 's',
    "AC" => 'm',
    "GT" => 'k',
    "AG" => 'r',
    "CT" => 'y',
    "CGT" => 'b',
    "AGT" => 'd',
    "ACT" => 'h',
    "ACG" => 'v',
    "ACGT" => 'n',
};

/// Looks up the ambiguity code for a set of bases.
///
/// `bases` must already be sorted and free of gaps; duplicates are not
/// collapsed. Returns `None` for any set outside the four standard bases.
pub fn ambiguity_code(bases: &[u8]) -> Option<char> {
    let key = std::str::from_utf8(bases).ok()?;
    IUPAC_CODES.get(key).copied()
}

/// True for the lower-case codes that stand for more than one base.
pub fn is_degenerate(symbol: char) -> bool {
    symbol.is_ascii_lowercase()
}
