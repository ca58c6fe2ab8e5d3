//! End-to-end dispatch tests
//!
//! These tests drive the public `SeqInput::read` API the way a caller would:
//! open an input with no format pinned, then read records until the input
//! runs dry.

use seqread::{FormatId, ReadError, ReadOptions, SeqInput, SeqRecord, SeqType};

fn open(text: &str) -> SeqInput {
    SeqInput::from_bytes(text, ReadOptions::default()).expect("Failed to open input")
}

fn read_names(input: &mut SeqInput) -> Vec<String> {
    let mut names = Vec::new();
    let mut seq = SeqRecord::new();
    while input.read(&mut seq).expect("Read failed") {
        names.push(seq.name.clone());
    }
    names
}

/// Plain FASTA with a description and a wrapped sequence
#[test]
fn test_fasta_two_records() {
    let mut input = open(">seq1 desc one\nACGT\nACGT\n>seq2\nTTTT\n");
    let mut seq = SeqRecord::new();

    assert!(input.read(&mut seq).unwrap());
    assert_eq!(seq.name, "seq1");
    assert_eq!(seq.description, "desc one");
    assert_eq!(seq.residues, "ACGTACGT");
    assert_eq!(seq.format, "fasta");

    assert!(input.read(&mut seq).unwrap());
    assert_eq!(seq.name, "seq2");
    assert_eq!(seq.description, "");
    assert_eq!(seq.residues, "TTTT");

    assert!(!input.read(&mut seq).unwrap());
    assert!(seq.name.is_empty());
    assert_eq!(input.format(), Some(FormatId::Fasta));
}

/// Plain FASTQ keeps the sequence and drops the qualities
#[test]
fn test_plain_fastq_ignores_quality() {
    let mut input = open("@r1 desc\nACGT\n+\n!!!!\n");
    let mut seq = SeqRecord::new();

    assert!(input.read(&mut seq).unwrap());
    assert_eq!(seq.name, "r1");
    assert_eq!(seq.residues, "ACGT");
    assert!(seq.quality.is_none());
    assert_eq!(input.format(), Some(FormatId::Fastq));
}

/// A quality line shorter than the sequence is corruption, not truncation
#[test]
fn test_fastq_quality_length_mismatch_rejected() {
    let mut input = open("@r1\nACGT\n+\n!!!\n");
    let mut seq = SeqRecord::new();

    let err = input.read(&mut seq).unwrap_err();
    assert!(
        matches!(err, ReadError::Corrupt { ref format, .. } if format.starts_with("fastq")),
        "unexpected error: {err}"
    );
    assert!(seq.residues.is_empty());
}

/// The same mismatch with the format pinned
#[test]
fn test_pinned_fastq_quality_length_mismatch() {
    let opts = ReadOptions {
        format: Some("fastq-sanger".to_string()),
        ..ReadOptions::default()
    };
    let mut input = SeqInput::from_bytes("@r1\nACGT\n+\n!!!!!\n", opts).unwrap();
    let mut seq = SeqRecord::new();
    assert!(matches!(input.read(&mut seq), Err(ReadError::Corrupt { .. })));
}

/// A protein LOCUS line goes to the Genpept parser
#[test]
fn test_protein_locus_read_as_genpept() {
    let text = "LOCUS       AAA98665   9 aa   linear   BCT   16-JUL-1998   x   y\n\
ACCESSION   AAA98665\n\
ORIGIN\n\
        1 mktayiakq\n\
//\n";
    let mut input = open(text);
    let mut seq = SeqRecord::new();

    assert!(input.read(&mut seq).unwrap());
    assert_eq!(seq.format, "genpept");
    assert_eq!(seq.seq_type, Some(SeqType::Protein));
    assert_eq!(seq.residues, "mktayiakq");
    assert_eq!(seq.accession(), Some("AAA98665"));
}

/// The flat description is rebuilt from the structured DE lines
#[test]
fn test_swissprot_description_rebuilt() {
    let text = "\
ID   FOO_HUMAN               Reviewed;         8 AA.
AC   P12345;
DE   RecName: Full=Foo;
DE   AltName: Short=Bar;
OS   Homo sapiens (Human).
SQ   SEQUENCE   8 AA;  900 MW;  AAA CRC64;
     MKWVTFIS
//
";
    let mut input = open(text);
    let mut seq = SeqRecord::new();

    assert!(input.read(&mut seq).unwrap());
    assert_eq!(seq.format, "swiss");
    assert_eq!(seq.name, "FOO_HUMAN");
    assert_eq!(seq.description, "Foo (Bar)");
    assert_eq!(seq.residues, "MKWVTFIS");
}

/// Every record of an alignment is handed out once, in order, then the
/// cache is dropped
#[test]
fn test_multi_record_cursor() {
    let text = "\
!!AA_MULTIPLE_ALIGNMENT 1.0
 pileup.msf  MSF: 10  Type: P  Check: 7207  ..

 Name: first  Len:   10  Check:  9706  Weight:  1.00
 Name: second  Len:   10  Check:  7206  Weight:  1.00
 Name: third  Len:   10  Check:  7206  Weight:  1.00

//

first   TSPASIRPPA
second  TSPASIRPP.
third   TSPAS.....
";
    let mut input = open(text);
    let mut seq = SeqRecord::new();

    for name in ["first", "second", "third"] {
        assert!(input.read(&mut seq).unwrap());
        assert_eq!(seq.name, name);
        assert_eq!(seq.format, "msf");
    }
    assert!(input.is_multi_done());

    assert!(!input.read(&mut seq).unwrap());
    assert!(seq.name.is_empty());
    assert!(format!("{input:?}").contains("cache: None"));
    assert!(!input.read(&mut seq).unwrap());
}

/// `read_all` stops at the end of each set of a multiset format
#[test]
fn test_read_all_per_set() {
    let text = "\
# STOCKHOLM 1.0
a  ACGT
b  AC-T
//
# STOCKHOLM 1.0
c  GGGG
//
";
    let mut input = open(text);
    let first: Vec<String> = input.read_all().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(first, vec!["a", "b"]);
    let second: Vec<String> = input.read_all().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(second, vec!["c"]);
    assert!(input.read_all().unwrap().is_empty());
}

/// Alignment formats are each recognised without a pinned format
#[test]
fn test_alignment_formats_autodetected() {
    let cases = [
        (
            "CLUSTAL W (1.83) multiple sequence alignment\n\n\nseq1      MKVLAAGIVG\nseq2      MKVL--GIVG\n          **** *****\n",
            FormatId::Clustal,
            vec!["seq1", "seq2"],
        ),
        (
            "#NEXUS\nbegin data;\ndimensions ntax=2 nchar=4;\nformat datatype=dna;\nmatrix\nalpha ACGT\nbeta  AC-T\n;\nend;\n",
            FormatId::Nexus,
            vec!["alpha", "beta"],
        ),
        (
            "# STOCKHOLM 1.0\nx  ACGU\ny  ACGA\n//\n",
            FormatId::Stockholm,
            vec!["x", "y"],
        ),
    ];
    for (text, format, names) in cases {
        let mut input = open(text);
        assert_eq!(read_names(&mut input), names, "{format:?}");
        assert_eq!(input.format(), Some(format));
    }
}

/// The entry query skips non-matching records in any format
#[test]
fn test_query_on_alignment() {
    let mut opts = ReadOptions::default();
    opts.query.set("id", "b*").unwrap();
    let text = "# STOCKHOLM 1.0\nalpha  ACGT\nbeta   ACGA\ngamma  ACGC\n//\n";
    let mut input = SeqInput::from_bytes(text, opts).unwrap();
    assert_eq!(read_names(&mut input), vec!["beta"]);
}

/// A type request that the residues fail is terminal
#[test]
fn test_bad_type_aborts() {
    let opts = ReadOptions {
        seq_type: seqread::TypeRequest::Dna,
        ..ReadOptions::default()
    };
    let mut input = SeqInput::from_bytes(">r\nACGU\n", opts).unwrap();
    let mut seq = SeqRecord::new();
    assert!(matches!(
        input.read(&mut seq),
        Err(ReadError::BadType { found: 'U', .. })
    ));
}

/// Unknown format and query field names are configuration errors
#[test]
fn test_configuration_errors() {
    let opts = ReadOptions {
        format: Some("no-such-format".to_string()),
        ..ReadOptions::default()
    };
    assert!(matches!(
        SeqInput::from_bytes(">a\nA\n", opts),
        Err(ReadError::UnknownFormat(_))
    ));

    let mut opts = ReadOptions::default();
    assert!(matches!(
        opts.query.set("colour", "red"),
        Err(ReadError::UnknownQueryField(_))
    ));
}

/// Binary formats are never tried on a stream, so a stream that is only
/// valid as a binary format is unrecognised
#[test]
fn test_binary_not_detected_on_stream() {
    let mut data = 0x6BE9_ED3A_u32.to_le_bytes().to_vec();
    data.extend(4u32.to_le_bytes());
    data.extend([0x01, 0x23]);
    let mut input =
        SeqInput::from_reader(std::io::Cursor::new(data), ReadOptions::default()).unwrap();
    let mut seq = SeqRecord::new();
    assert!(input.read(&mut seq).is_err());
}

/// Addresses carry a format, an entry and a range
#[test]
fn test_address_with_entry_and_range() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, ">a\nAAAA\n>b\nACGTACGT\n>c\nCCCC\n").unwrap();
    let address = format!("fasta::{}:b[2:5:r]", file.path().display());

    let mut input = SeqInput::from_usa(&address, ReadOptions::default()).unwrap();
    let mut seq = SeqRecord::new();
    assert!(input.read(&mut seq).unwrap());
    assert_eq!(seq.name, "b");
    // residues 2 to 5 are CGTA, reverse complemented
    assert_eq!(seq.range_residues(), "TACG");
    assert!(!input.read(&mut seq).unwrap());
}

/// restart() rewinds and forgets the detected format
#[test]
fn test_restart_rereads() {
    let mut input = open(">a\nAC\n>b\nGT\n");
    assert_eq!(read_names(&mut input), vec!["a", "b"]);
    input.restart().unwrap();
    assert_eq!(read_names(&mut input), vec!["a", "b"]);
}

/// A PHYLIP header declaring more sequences than any table may hold is an
/// error, even while autodetecting
#[test]
fn test_oversized_phylip_header_rejected() {
    let mut input = open(" 100000000000000 4\nseqA      ACGT\n");
    let mut seq = SeqRecord::new();
    assert!(matches!(
        input.read(&mut seq),
        Err(ReadError::TooManySequences(_))
    ));
}

/// Older MEGA files with a `TITLE:` header line are still MEGA
#[test]
fn test_mega_title_line_autodetected() {
    let mut input = open("#mega\nTITLE: primates\n\n#human ACGT\n#chimp ACGA\n");
    assert_eq!(read_names(&mut input), vec!["human", "chimp"]);
    assert_eq!(input.format(), Some(FormatId::Mega));
}
