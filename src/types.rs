use ndarray::Array2;

/// Gap character used to pad aligned sequences
pub const GAP: u8 = b'-';

/// Output field delimiter for PID matrices and primer tables
pub const DELIMITER: char = ';';

/// Aligned residues, one row per sequence and one column per alignment column
pub type ResidueMatrix = Array2<u8>;

/// Square matrix of percentage identities, indexed like the alignment rows
pub type PidMatrix = Array2<f64>;

/// Formats a float the way the output tables expect: shortest round-trip
/// digits, always with a fractional part (`100.0`, `81.81818181818183`).
/// Values below 1e-4 or from 1e16 up use a signed exponent of at least two
/// digits (`5e-05`, `1e+16`).
pub(crate) fn format_decimal(value: f64) -> String {
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}

/// Rounds to three decimal places, exact halves going to the even neighbour
/// (13/16 = 0.8125 becomes 0.812).
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}
