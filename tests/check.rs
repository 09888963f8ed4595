use pennine::step::check::{compute_crc, finish_crc};

fn crc(r: &[u8]) -> u16 {
    finish_crc(compute_crc(0, r))
}

#[test]
fn reference_vectors() {
    assert_eq!(crc(&[0x69, 0x00]), 0xAFD1);
    assert_eq!(crc(b"123456789"), 0x44C2);
    assert_eq!(crc(&[0x5A, 0xA5, 0x02, 0x48, 0x69]), 0xD0D2);
}

#[test]
fn deterministic() {
    let buf = [0xDE, 0xAD, 0xBE, 0xEF];
    assert_eq!(crc(&buf), crc(&buf));
}

#[test]
fn single_bit_flips_change_the_check() {
    let buf: [u8; 10] = [0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19];
    let baseline = crc(&buf);
    assert_eq!(baseline, 0x7FED);

    for i in 0..buf.len() {
        for bit in 0..8 {
            let mut corrupted = buf;
            corrupted[i] ^= 1 << bit;
            assert_ne!(crc(&corrupted), baseline, "byte {i}, bit {bit}");
        }
    }
}

#[test]
fn accumulates_across_splits() {
    let buf = *b"split anywhere";
    let whole = compute_crc(0, &buf);

    for i in 0..buf.len() {
        let (head, tail) = buf.split_at(i);
        assert_eq!(compute_crc(compute_crc(0, head), tail), whole);
    }
}
