use super::*;

const AUD: &[u8] = &[0, 0, 0, 1, 0x09, 0xf0];
const SPS: &[u8] = &[0, 0, 0, 1, 0x67, 0x42, 0x00, 0x1f];
const PPS: &[u8] = &[0, 0, 1, 0x68, 0xce, 0x3c, 0x80];
const IDR: &[u8] = &[0, 0, 0, 1, 0x65, 0x88, 0x84, 0x00, 0x33];
const P: &[u8] = &[0, 0, 0, 1, 0x41, 0x9a, 0x02, 0x04];

fn stream(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

#[test]
fn nal_units_skip_start_codes() {
    let data = stream(&[SPS, PPS, IDR]);
    let types: Vec<u8> = nal_units(&data).filter_map(nal_type).collect();
    assert_eq!(types, vec![7, 8, 5]);
    assert!(contains_idr(&data));
    assert!(!contains_idr(&stream(&[AUD, P])));
}

#[test]
fn strip_aud_removes_only_delimiters() {
    let au = stream(&[AUD, SPS, PPS, IDR]);
    let stripped = strip_aud(&au);
    let types: Vec<u8> = nal_units(&stripped).filter_map(nal_type).collect();
    assert_eq!(types, vec![7, 8, 5]);
    assert!(stripped.starts_with(&[0, 0, 0, 1, 0x67]));
}

#[test]
fn splitter_emits_unit_when_next_delimiter_arrives() {
    let data = stream(&[AUD, SPS, PPS, IDR, AUD, P, AUD, P]);
    let mut s = AccessUnitSplitter::new();
    let aus = s.push(&data);
    assert_eq!(aus.len(), 2);
    assert_eq!(aus[0], stream(&[AUD, SPS, PPS, IDR]));
    assert_eq!(aus[1], stream(&[AUD, P]));
    assert_eq!(s.finish(), Some(stream(&[AUD, P])));
    assert_eq!(s.finish(), None);
}

#[test]
fn splitter_handles_arbitrary_chunking() {
    let data = stream(&[AUD, SPS, PPS, IDR, AUD, P, AUD, P, AUD, IDR]);
    let expected = vec![
        stream(&[AUD, SPS, PPS, IDR]),
        stream(&[AUD, P]),
        stream(&[AUD, P]),
        stream(&[AUD, IDR]),
    ];

    for chunk in 1..=data.len() {
        let mut s = AccessUnitSplitter::new();
        let mut aus = Vec::new();
        for piece in data.chunks(chunk) {
            aus.extend(s.push(piece));
        }
        aus.extend(s.finish());
        assert_eq!(aus, expected, "chunk size {chunk}");
    }
}

#[test]
fn lone_delimiter_is_not_a_frame() {
    let mut s = AccessUnitSplitter::new();
    assert!(s.push(AUD).is_empty());
    assert_eq!(s.finish(), None);
}
