use msa_primers::primers::{design_primers, write_primers, PrimerScan};
use msa_primers::{fasta, Alignment, MsaError, PrimerParams};

fn alignment(seqs: &[&str]) -> Alignment {
    let names = (1..=seqs.len()).map(|i| format!("seq{}", i)).collect();
    Alignment::new(names, seqs).unwrap()
}

fn params(primer_size: usize, occurrence: f64, degen_nucleo_percent: f64) -> PrimerParams {
    PrimerParams {
        primer_size,
        occurrence,
        degen_nucleo_percent,
    }
}

#[test]
fn test_default_params_on_fixture() {
    let aln = fasta::read_alignment("tests/data/aligned.fasta").unwrap();
    let mut out = Vec::new();
    let written = write_primers(&aln, PrimerParams::default(), &mut out).unwrap();

    let expected = "\
ATGCGTACGTTAGC-ATGCAA;0;21;19.8
TGCGTACGTTAGC-ATGCAAG;1;22;19.8
GCGTACGTTAGC-ATGCAAGT;2;23;19.6
CGTACGTTAGC-ATGCAAGTC;3;24;19.8
GTACGTTAGC-ATGCAAGTCC;4;25;19.8
TACGTTAGC-ATGCAAGTCCG;5;26;20.0
ACGTTAGC-ATGCAAGTCCGA;6;27;19.8
CGTTAGC-ATGCAAGTCCGAT;7;28;19.8
GTTAGC-ATGCAAGTCCGATT;8;29;19.6
TTAGC-ATGCAAGTCCGATTA;9;30;19.4
TAGC-ATGCAAGTCCGATTAC;10;31;19.4
AGC-ATGCAAGTCCGATTACG;11;32;19.4
";
    assert_eq!(written, 12);
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
fn test_degenerate_primers_on_fixture() {
    let aln = fasta::read_alignment("tests/data/aligned.fasta").unwrap();
    let primers = design_primers(&aln, params(8, 0.9, 30.0)).unwrap();

    assert_eq!(primers.len(), 23);
    assert_eq!(primers[0].to_string(), "ATsCrTAC;0;8;7.6");
    // window 2 carries three ambiguity codes (37.5%) and is dropped
    assert_eq!(primers[2].to_string(), "CrTACGwT;3;11;7.6");
    assert_eq!(primers[22].to_string(), "CGrTTAmG;24;32;7.2");

    let starts: Vec<usize> = primers.iter().map(|p| p.start).collect();
    assert!(starts.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_candidate_properties() {
    let aln = fasta::read_alignment("tests/data/aligned.fasta").unwrap();
    for (size, occurrence, percent) in [(5, 0.7, 50.0), (10, 0.8, 20.0), (12, 1.0, 100.0)] {
        for primer in design_primers(&aln, params(size, occurrence, percent)).unwrap() {
            assert_eq!(primer.sequence.chars().count(), size);
            assert_eq!(primer.stop - primer.start, size);
            assert!(primer.score >= 0.0 && primer.score <= size as f64);
            assert!(!primer.sequence.contains("--"));
            assert!(primer.degenerate_percent() < percent);
        }
    }
}

#[test]
fn test_two_haplotype_column() {
    let aln = alignment(&["ACGTA", "ACGTA", "ACCTA", "ACCTA"]);
    let primers = design_primers(&aln, params(5, 0.8, 50.0)).unwrap();
    assert_eq!(primers.len(), 1);
    assert_eq!(primers[0].sequence, "ACsTA");
    assert_eq!(primers[0].score, 4.5);

    let aln = alignment(&["AC", "AC", "TC", "TC"]);
    let primers = design_primers(&aln, params(2, 0.8, 100.0)).unwrap();
    assert_eq!(primers[0].sequence, "wC");
    assert_eq!(primers[0].score, 1.5);
}

#[test]
fn test_consecutive_gaps_rejected() {
    let aln = alignment(&["AC--GT", "AC--GT", "ACTTGT"]);
    let primers = design_primers(&aln, params(3, 0.6, 100.0)).unwrap();
    let sequences: Vec<&str> = primers.iter().map(|p| p.sequence.as_str()).collect();
    // only windows without the two-column gap run survive
    assert_eq!(sequences, vec!["AC-", "-GT"]);

    let primers = design_primers(&aln, params(2, 0.6, 100.0)).unwrap();
    let starts: Vec<usize> = primers.iter().map(|p| p.start).collect();
    assert_eq!(starts, vec![0, 1, 3, 4]);
    assert_eq!(primers[1].sequence, "C-");
}

#[test]
fn test_degenerate_percent_is_exclusive() {
    // one ambiguity code in five positions is exactly 20%
    let aln = alignment(&["ACGTA", "ACGTA", "ACCTA", "ACCTA"]);
    assert!(design_primers(&aln, params(5, 0.8, 20.0)).unwrap().is_empty());
    assert_eq!(design_primers(&aln, params(5, 0.8, 20.1)).unwrap().len(), 1);
}

#[test]
fn test_oversized_primer_yields_nothing() {
    let aln = alignment(&["ACGTACGTAC", "ACGTACGTAC"]);
    let scan = PrimerScan::new(&aln, params(11, 0.8, 20.0)).unwrap();
    assert_eq!(scan.window_count(), 0);
    assert_eq!(scan.count(), 0);

    let empty = Alignment::new(Vec::new(), &[] as &[&str]).unwrap();
    let mut out = Vec::new();
    assert_eq!(write_primers(&empty, PrimerParams::default(), &mut out).unwrap(), 0);
    assert!(out.is_empty());
}

#[test]
fn test_invalid_params_rejected_before_scan() {
    let aln = alignment(&["ACGTACGTAC", "ACGTACGTAC"]);
    for bad in [params(0, 0.8, 20.0), params(5, 0.0, 20.0), params(5, 1.2, 20.0), params(5, 0.8, 120.0)] {
        let mut out = Vec::new();
        let result = write_primers(&aln, bad, &mut out);
        assert!(matches!(result, Err(MsaError::InvalidParameter { .. })));
        assert!(out.is_empty());
    }
}

#[test]
fn test_unknown_base_set_is_error() {
    let aln = alignment(&["ACGNA", "ACGTA", "ACGNA", "ACGTA"]);
    match design_primers(&aln, params(3, 0.8, 100.0)) {
        Err(MsaError::AmbiguityLookup { column, bases }) => {
            assert_eq!(column, 3);
            assert_eq!(bases, "NT");
        }
        other => panic!("expected AmbiguityLookup, got {:?}", other),
    }
}

#[test]
fn test_frequency_halves_round_to_even() {
    // 13 of 16 rows is 0.8125, reported as 0.812
    let mut rows = vec!["AA"; 13];
    rows.extend(["CA"; 3]);
    let aln = alignment(&rows);

    let mut out = Vec::new();
    write_primers(&aln, params(1, 0.5, 20.0), &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "A;0;1;0.812\nA;1;2;1.0\n");

    // the rounded frequency falls below a threshold of 0.8125
    let primers = design_primers(&aln, params(2, 0.8125, 100.0)).unwrap();
    assert_eq!(primers.len(), 1);
    assert_eq!(primers[0].to_string(), "mA;0;2;1.812");
}
