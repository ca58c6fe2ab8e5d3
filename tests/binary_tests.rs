//! Binary format tests
//!
//! Each test builds a small trace, nibble or BAM file in memory, writes it
//! to a temporary file and reads it back through autodetection, the way a
//! user would open it from disk.

use std::io::Write;

use seqread::{FormatId, ReadError, ReadOptions, SeqInput, SeqRecord, SeqType};
use tempfile::NamedTempFile;

fn write_temp(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(data).expect("Failed to write temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

fn open(file: &NamedTempFile) -> SeqInput {
    SeqInput::from_path(file.path(), ReadOptions::default()).expect("Failed to open temp file")
}

// ---------------------------------------------------------------------------
// SCF
// ---------------------------------------------------------------------------

/// Version 2 SCF: one 12-byte record per base
fn scf_v2(bases: &[u8], probs: &[[u8; 4]], comments: &[u8]) -> Vec<u8> {
    let header_size = 128u32;
    let bases_offset = header_size;
    let comments_offset = bases_offset + 12 * bases.len() as u32;

    let mut out = Vec::new();
    out.extend(0x2E73_6366u32.to_be_bytes());
    out.extend(0u32.to_be_bytes()); // samples
    out.extend(header_size.to_be_bytes()); // samples offset
    out.extend((bases.len() as u32).to_be_bytes());
    out.extend(0u32.to_be_bytes()); // left clip
    out.extend(0u32.to_be_bytes()); // right clip
    out.extend(bases_offset.to_be_bytes());
    out.extend((comments.len() as u32).to_be_bytes());
    out.extend(comments_offset.to_be_bytes());
    out.extend(b"2.00");
    out.resize(header_size as usize, 0);

    for (i, (&base, p)) in bases.iter().zip(probs).enumerate() {
        out.extend((i as u32 * 3).to_be_bytes());
        out.extend(p);
        out.push(base);
        out.extend([0u8; 3]);
    }
    out.extend(comments);
    out
}

#[test]
fn test_scf_v2_autodetected() {
    let data = scf_v2(
        b"GATC",
        &[[0, 0, 40, 0], [35, 0, 0, 0], [0, 0, 0, 25], [0, 15, 0, 0]],
        b"NAME=clone_7\nMACH=ABI 373\n\0",
    );
    let file = write_temp(&data);
    let mut input = open(&file);
    let mut seq = SeqRecord::new();

    assert!(input.read(&mut seq).unwrap());
    assert_eq!(input.format(), Some(FormatId::Scf));
    assert_eq!(seq.name, "clone_7");
    assert_eq!(seq.residues, "GATC");
    assert_eq!(seq.quality, Some(vec![40.0, 35.0, 25.0, 15.0]));
    assert_eq!(seq.seq_type, Some(SeqType::Nucleotide));
    assert!(seq.comments.iter().any(|c| c == "MACH=ABI 373"));
    assert!(!input.read(&mut seq).unwrap());
}

#[test]
fn test_scf_without_name_uses_filename() {
    let data = scf_v2(b"AC", &[[20, 0, 0, 0], [0, 20, 0, 0]], b"");
    let file = write_temp(&data);
    let mut input = open(&file);
    let mut seq = SeqRecord::new();

    assert!(input.read(&mut seq).unwrap());
    let stem = file.path().file_stem().unwrap().to_string_lossy().into_owned();
    assert_eq!(seq.name, stem);
}

#[test]
fn test_truncated_scf_is_an_error() {
    let mut data = scf_v2(b"GATC", &[[0; 4]; 4], b"");
    data.truncate(140);
    let file = write_temp(&data);
    let opts = ReadOptions {
        format: Some("scf".to_string()),
        ..ReadOptions::default()
    };
    let mut input = SeqInput::from_path(file.path(), opts).unwrap();
    let mut seq = SeqRecord::new();
    assert!(matches!(input.read(&mut seq), Err(ReadError::Binary(_))));
}

#[test]
fn test_scf_base_count_beyond_file_is_an_error() {
    let mut data = scf_v2(b"GATC", &[[0; 4]; 4], b"");
    data[12..16].copy_from_slice(&0xFFFF_FFF0u32.to_be_bytes());
    data[36..40].copy_from_slice(b"3.00");
    data.truncate(128);
    let file = write_temp(&data);
    let opts = ReadOptions {
        format: Some("scf".to_string()),
        ..ReadOptions::default()
    };
    let mut input = SeqInput::from_path(file.path(), opts).unwrap();
    let mut seq = SeqRecord::new();
    assert!(matches!(input.read(&mut seq), Err(ReadError::Binary(_))));
}

// ---------------------------------------------------------------------------
// ABI
// ---------------------------------------------------------------------------

fn abi_entry(name: &[u8; 4], number: i32, data: &[u8], offset: usize) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(name);
    out.extend(number.to_be_bytes());
    out.extend(2i16.to_be_bytes());
    out.extend(1i16.to_be_bytes());
    out.extend((data.len() as i32).to_be_bytes());
    out.extend((data.len() as i32).to_be_bytes());
    if data.len() <= 4 {
        let mut inline = [0u8; 4];
        inline[..data.len()].copy_from_slice(data);
        out.extend(inline);
    } else {
        out.extend((offset as i32).to_be_bytes());
    }
    out.extend(0i32.to_be_bytes());
    out
}

/// ABIF file holding `PBAS 1` only, with inline qualities and no sample name
fn abif(bases: &[u8], quals: &[u8]) -> Vec<u8> {
    let data_start = 128usize;
    let dir_offset = data_start + bases.len();
    let mut out = b"ABIF".to_vec();
    out.extend(101u16.to_be_bytes());
    // root entry: tag directory with two elements
    out.extend(b"tdir");
    out.extend(1i32.to_be_bytes());
    out.extend(1023i16.to_be_bytes());
    out.extend(28i16.to_be_bytes());
    out.extend(2i32.to_be_bytes());
    out.extend(56i32.to_be_bytes());
    out.extend((dir_offset as i32).to_be_bytes());
    out.extend(0i32.to_be_bytes());
    out.resize(data_start, 0);
    out.extend(bases);
    out.extend(abi_entry(b"PBAS", 1, bases, data_start));
    out.extend(abi_entry(b"PCON", 1, quals, 0));
    out
}

#[test]
fn test_abi_autodetected() {
    let file = write_temp(&abif(b"ACGTTGCA", &[10, 20, 30, 40]));
    let mut input = open(&file);
    let mut seq = SeqRecord::new();

    assert!(input.read(&mut seq).unwrap());
    assert_eq!(input.format(), Some(FormatId::Abi));
    assert_eq!(seq.residues, "ACGTTGCA");
    assert_eq!(seq.quality, Some(vec![10.0, 20.0, 30.0, 40.0]));
    // four PCON values for eight bases
    assert!(!input.warnings().is_empty());
    let stem = file.path().file_stem().unwrap().to_string_lossy().into_owned();
    assert_eq!(seq.name, stem);
}

#[test]
fn test_abi_directory_beyond_file_is_an_error() {
    let mut data = abif(b"ACGTTGCA", &[10, 20, 30, 40]);
    // root entry: elements at 18, data offset at 26
    data[18..22].copy_from_slice(&0x7FFF_FFFFi32.to_be_bytes());
    data[26..30].copy_from_slice(&40i32.to_be_bytes());
    data.truncate(128);
    let file = write_temp(&data);
    let opts = ReadOptions {
        format: Some("abi".to_string()),
        ..ReadOptions::default()
    };
    let mut input = SeqInput::from_path(file.path(), opts).unwrap();
    let mut seq = SeqRecord::new();
    assert!(matches!(input.read(&mut seq), Err(ReadError::Binary(_))));
}

// ---------------------------------------------------------------------------
// Nibble
// ---------------------------------------------------------------------------

#[test]
fn test_byte_swapped_nibble_accepted() {
    // the magic as written by a machine of the other byte order
    let mut data = 0x3AED_E96Bu32.to_le_bytes().to_vec();
    data.extend(7u32.to_be_bytes());
    data.extend([0x01, 0x23, 0x89, 0x20]);
    let file = write_temp(&data);
    let mut input = open(&file);
    let mut seq = SeqRecord::new();

    assert!(input.read(&mut seq).unwrap());
    assert_eq!(input.format(), Some(FormatId::Nibble));
    assert_eq!(seq.residues, "TCAGTCA");
    assert_eq!(seq.seq_type, Some(SeqType::Nucleotide));
    assert!(!input.read(&mut seq).unwrap());
}

#[test]
fn test_native_nibble_with_range() {
    let mut data = 0x6BE9_ED3Au32.to_le_bytes().to_vec();
    data.extend(4u32.to_le_bytes());
    data.extend([0x22, 0x33]);
    let file = write_temp(&data);
    let opts = ReadOptions {
        begin: Some(2),
        end: Some(3),
        ..ReadOptions::default()
    };
    let mut input = SeqInput::from_path(file.path(), opts).unwrap();
    let mut seq = SeqRecord::new();

    assert!(input.read(&mut seq).unwrap());
    assert_eq!(seq.residues, "AAGG");
    assert_eq!(seq.range_residues(), "AG");
}

// ---------------------------------------------------------------------------
// BAM
// ---------------------------------------------------------------------------

/// One BGZF block holding `data`, followed by the EOF marker block
fn bgzf(data: &[u8]) -> Vec<u8> {
    let mut encoder =
        flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    let deflated = encoder.finish().unwrap();
    let mut crc = flate2::Crc::new();
    crc.update(data);

    let block_size = (18 + deflated.len() + 8 - 1) as u16;
    let mut out = vec![0x1f, 0x8b, 0x08, 0x04, 0, 0, 0, 0, 0, 0xff, 6, 0, b'B', b'C', 2, 0];
    out.extend(block_size.to_le_bytes());
    out.extend(&deflated);
    out.extend(crc.sum().to_le_bytes());
    out.extend((data.len() as u32).to_le_bytes());
    out.extend([
        0x1f, 0x8b, 0x08, 0x04, 0, 0, 0, 0, 0, 0xff, 6, 0, b'B', b'C', 2, 0, 0x1b, 0, 3, 0, 0, 0,
        0, 0, 0, 0, 0, 0,
    ]);
    out
}

/// Unmapped BAM record with no CIGAR
fn bam_record(name: &str, flag: u16, packed: &[u8], len: usize, qual: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend((-1i32).to_le_bytes()); // refID
    body.extend((-1i32).to_le_bytes()); // pos
    body.push((name.len() + 1) as u8);
    body.push(0); // mapq
    body.extend(4680u16.to_le_bytes()); // bin
    body.extend(0u16.to_le_bytes()); // n_cigar
    body.extend(flag.to_le_bytes());
    body.extend((len as i32).to_le_bytes());
    body.extend((-1i32).to_le_bytes());
    body.extend((-1i32).to_le_bytes());
    body.extend(0i32.to_le_bytes());
    body.extend(name.as_bytes());
    body.push(0);
    body.extend(packed);
    body.extend(qual);

    let mut out = (body.len() as i32).to_le_bytes().to_vec();
    out.extend(body);
    out
}

fn bam_file(records: &[Vec<u8>]) -> Vec<u8> {
    let mut data = b"BAM\x01".to_vec();
    let text = b"@HD\tVN:1.6\n";
    data.extend((text.len() as i32).to_le_bytes());
    data.extend(text);
    data.extend(0i32.to_le_bytes());
    for r in records {
        data.extend(r);
    }
    bgzf(&data)
}

#[test]
fn test_bam_autodetected() {
    // ACGT packed as 1 2 4 8, TTA as 8 8 1
    let data = bam_file(&[
        bam_record("read1", 0, &[0x12, 0x48], 4, &[30, 31, 32, 33]),
        bam_record("read2", 0x10, &[0x88, 0x10], 3, &[5, 6, 7]),
    ]);
    let file = write_temp(&data);
    let mut input = open(&file);
    let mut seq = SeqRecord::new();

    assert!(input.read(&mut seq).unwrap());
    assert_eq!(input.format(), Some(FormatId::Bam));
    assert_eq!(seq.name, "read1");
    assert_eq!(seq.residues, "ACGT");
    assert_eq!(seq.quality, Some(vec![30.0, 31.0, 32.0, 33.0]));
    assert!(seq.comments.is_empty());

    assert!(input.read(&mut seq).unwrap());
    assert_eq!(seq.name, "read2");
    // reverse strand: stored as sequenced
    assert_eq!(seq.residues, "TAA");
    assert_eq!(seq.quality, Some(vec![7.0, 6.0, 5.0]));

    assert!(!input.read(&mut seq).unwrap());
}

#[test]
fn test_binary_formats_skipped_on_streams() {
    let data = bam_file(&[bam_record("read1", 0, &[0x12, 0x48], 4, &[30; 4])]);
    let mut input =
        SeqInput::from_reader(std::io::Cursor::new(data), ReadOptions::default()).unwrap();
    let mut seq = SeqRecord::new();
    assert!(input.read(&mut seq).is_err());
    assert_eq!(input.format(), None);
}
