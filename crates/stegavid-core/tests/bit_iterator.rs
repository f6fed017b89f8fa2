use bitstream_io::{BigEndian, BitRead, BitReader};

use stegavid_core::bit_iterator::{BitIterator, ByteAssembler};

#[test]
fn should_return_the_bits_of_h_most_significant_first() {
    let b = [0b0100_1000, 0b0110_0001, 0b0110_1100];
    let mut it = BitIterator::new(&b[..]);

    assert!(!it.next().unwrap(), "1st bit not correct");
    assert!(it.next().unwrap(), "2nd bit not correct");
    assert!(!it.next().unwrap(), "3rd bit not correct");
    assert!(!it.next().unwrap(), "4th bit not correct");
    assert!(it.next().unwrap(), "5th bit not correct");
    assert!(!it.next().unwrap(), "6th bit not correct");
    assert!(!it.next().unwrap(), "7th bit not correct");
    assert!(!it.next().unwrap(), "8th bit not correct");
}

#[test]
fn should_return_8_bits_of_a_after_skip_8() {
    let b = [0b0100_1000, 0b0110_0001];
    let it = BitIterator::new(&b[..]).skip(8);

    assert_eq!(
        it.collect::<Vec<_>>(),
        vec![false, true, true, false, false, false, false, true],
        "it should end after the last bit on the last byte"
    );
}

#[test]
fn should_behave_as_the_big_endian_bit_reader() {
    let b = [0b0100_1000, 0b0110_0001];
    let mut it = BitIterator::new(&b[..]);
    let mut reader = BitReader::endian(&b[..], BigEndian);

    for i in 0..16 {
        assert_eq!(
            it.next().unwrap(),
            reader.read_bit().unwrap(),
            "{} bit not correct",
            i
        );
    }
}

#[test]
fn should_pack_bits_into_the_original_bytes() {
    let b = b"STEG_FILE_START";
    let mut assembler = ByteAssembler::new();
    let packed: Vec<u8> = BitIterator::new(&b[..])
        .filter_map(|bit| assembler.push_bit(bit))
        .collect();

    assert_eq!(packed.as_slice(), b);
}
