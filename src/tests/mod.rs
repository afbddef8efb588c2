//! End-to-end tests over synthetic ROM images that lay out all five text
//! regions the way a real cartridge does.

use byteorder::{ByteOrder, LittleEndian};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::decoding::lookup_table::{pack_reversed, LookupTable};
use crate::decoding::offset_table::NO_TREE_OFFSET;
use crate::decoding::string_table::{StringDecodeError, StringTable};
use crate::decoding::tree::{CharTree, TextForest};
use crate::rom::{RomBytes, ROM_BASE};
use crate::{
    BitOrder, DecodeError, DecoderState, ForestParams, TextDecoder, TreeConvention,
};

const CONVENTION: TreeConvention = TreeConvention {
    bit_order: BitOrder::Msb0,
    leaf_when_set: true,
};

const TREE_BLOCK_BASE: usize = 0x10;
const OFFSET_TABLE_BASE: usize = 0x28;
const PAIR_ADDRESS: usize = 0xbe;
const TEXT_BASE: usize = 0xc8;

/// Builds an image holding trees for NUL, 'H' and 'I'. Each character gets
/// a two-symbol lookup table and the three-node tree `0b011_00000` (branch,
/// leaf, leaf), so path bit 0 selects lookup index 0 and bit 1 index 1.
///
/// NUL decodes to 'H' or 'I', 'H' to 'I' or 'A', 'I' to 'H' or 'A'. 'A' has
/// no tree, which is reachable corruption on purpose.
fn synthetic_image() -> RomBytes {
    let mut data = vec![0u8; 0x200];

    // Tree block: [guard][lookup][tree] per character. The guard groups
    // stop the backward lookup scans; in a real image the previous tree's
    // bytes play that role.
    let chars: [(u8, u16, &[u16]); 3] = [
        (0x00, 6, &[u16::from(b'H'), u16::from(b'I')]),
        (b'H', 13, &[u16::from(b'I'), u16::from(b'A')]),
        (b'I', 20, &[u16::from(b'H'), u16::from(b'A')]),
    ];
    let mut cursor = TREE_BLOCK_BASE;
    for (_, offset, symbols) in &chars {
        let packed = pack_reversed(symbols);
        data[cursor..cursor + packed.len()].copy_from_slice(&packed);
        cursor += packed.len();
        assert_eq!(cursor, TREE_BLOCK_BASE + *offset as usize);
        data[cursor] = 0b0110_0000;
        cursor += 1;
    }

    // Offset table: codes 0..=0x49, everything but the three real
    // characters marked empty, then one padding word.
    let mut address = OFFSET_TABLE_BASE;
    for code in 0..=b'I' {
        let raw = chars
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(_, offset, _)| *offset)
            .unwrap_or(NO_TREE_OFFSET);
        LittleEndian::write_u16(&mut data[address..], raw);
        address += 2;
    }
    LittleEndian::write_u16(&mut data[address..], 0x0000);
    assert_eq!(address + 2, PAIR_ADDRESS);

    // The pointer pair, and a compressed text area of all-zero path bits.
    LittleEndian::write_u32(
        &mut data[PAIR_ADDRESS..],
        ROM_BASE + TREE_BLOCK_BASE as u32,
    );
    LittleEndian::write_u32(
        &mut data[PAIR_ADDRESS + 4..],
        ROM_BASE + OFFSET_TABLE_BASE as u32,
    );
    RomBytes::new(data)
}

fn build_forest(rom: &RomBytes) -> TextForest {
    TextForest::build(
        rom,
        &ForestParams {
            pair_address: PAIR_ADDRESS,
            convention: CONVENTION,
        },
    )
    .unwrap()
}

#[test]
fn forest_builds_from_a_full_image() {
    let rom = synthetic_image();
    let forest = build_forest(&rom);

    // Codes 0..=0x49 appeared before the padding word.
    assert_eq!(forest.len(), 0x4a);

    let nul = forest.entry(0).unwrap();
    assert_eq!(nul.lookup().symbols(), &[u16::from(b'H'), u16::from(b'I')]);
    assert_eq!(nul.tree().leaf_count(), 2);
    assert_eq!(nul.span().start, TREE_BLOCK_BASE + 6);
    // NUL's tree ends where H's lookup table starts.
    assert_eq!(nul.span().end, TREE_BLOCK_BASE + 13 - 3);

    let i = forest.entry(u16::from(b'I')).unwrap();
    assert_eq!(i.span().end, OFFSET_TABLE_BASE - 1);

    // 0x8000 characters exist in the table but own no tree.
    assert!(forest.entry(u16::from(b'A')).is_none());
    // Codes past the padding word do not exist at all.
    assert!(forest.entry(0x50).is_none());
}

#[test]
fn forest_construction_is_idempotent() {
    let rom = synthetic_image();
    let a = build_forest(&rom);
    let b = build_forest(&rom);
    assert_eq!(a.len(), b.len());
    for ((code_a, entry_a), (_, entry_b)) in a.entries().zip(b.entries()) {
        match (entry_a, entry_b) {
            (Some(ea), Some(eb)) => {
                assert_eq!(ea.span(), eb.span(), "span mismatch for {:#x}", code_a);
                assert_eq!(ea.lookup().symbols(), eb.lookup().symbols());
            }
            (None, None) => {}
            _ => panic!("slot mismatch for {:#x}", code_a),
        }
    }
}

#[test]
fn decodes_through_an_image_built_forest() {
    let rom = synthetic_image();
    let forest = build_forest(&rom);

    // All-zero path bits walk NUL -> 'H' -> 'I' -> 'H' -> ... and none of
    // the synthetic lookup tables can produce a terminator, so the guard
    // has to end it.
    let mut decoder = TextDecoder::new(&forest, &rom, TEXT_BASE * 8).with_limit(4);
    let mut out = String::new();
    let err = loop {
        match decoder.decode_next() {
            Ok(Some(c)) => out.push(c),
            Ok(None) => panic!("no terminator is reachable"),
            Err(e) => break e,
        }
    };
    assert_eq!(out, "HIHI");
    assert!(matches!(err, DecodeError::Runaway { limit: 4 }));
    assert_eq!(decoder.state(), DecoderState::Faulted);
}

#[test]
fn a_bad_string_does_not_stop_enumeration() {
    // Hand-built forest where strings can actually terminate: NUL picks
    // 'H' or 'I', 'H' picks 'I' or end, 'I' picks 'H' or end.
    let two_leaf = || CharTree::parse(&[0b0110_0000], CONVENTION).unwrap();
    let forest = TextForest::from_entries(
        vec![
            (
                0,
                two_leaf(),
                LookupTable::from_symbols(vec![u16::from(b'H'), u16::from(b'I')]),
            ),
            (
                b'H',
                two_leaf(),
                LookupTable::from_symbols(vec![u16::from(b'I'), 0]),
            ),
            (
                b'I',
                two_leaf(),
                LookupTable::from_symbols(vec![u16::from(b'H'), 0]),
            ),
        ],
        CONVENTION,
    );

    let mut data = vec![0u8; 0x40];
    // Entry 0: "HI" (bits 0 0 1) at offset 0x20.
    data[0x20] = 0b0010_0000;
    // Entry 2: "H" (bits 0 1) at offset 0x21.
    data[0x21] = 0b0100_0000;
    // String table at 0: good, bad pointer, good.
    LittleEndian::write_u32(&mut data[0x00..], ROM_BASE + 0x20);
    LittleEndian::write_u32(&mut data[0x04..], ROM_BASE + 0x30);
    LittleEndian::write_u32(&mut data[0x08..], 0x0200_0000); // below ROM base
    LittleEndian::write_u32(&mut data[0x0c..], ROM_BASE + 0x34);
    LittleEndian::write_u32(&mut data[0x10..], ROM_BASE + 0x21);
    LittleEndian::write_u32(&mut data[0x14..], ROM_BASE + 0x38);
    let rom = RomBytes::new(data);

    let table = StringTable::parse(&rom, 0, 3).unwrap();
    let results: Vec<_> = table.decode_all(&forest, &rom, 64).collect();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_deref().unwrap(), "HI");
    assert!(matches!(
        results[1],
        Err(StringDecodeError::Pointer(_))
    ));
    assert_eq!(results[2].as_deref().unwrap(), "H");
}

#[test]
fn never_panics_on_garbage() {
    // Random tree blocks and offset tables must either build or error,
    // and any forest that does build must decode without panicking and
    // within the runaway guard.
    let mut rng = SmallRng::seed_from_u64(0x600d_5eed);

    for _ in 0..64 {
        let mut data = vec![0u8; 0x400];
        rng.fill(&mut data[..]);

        let pair_address = 0x300;
        // Keep the pointer pair itself plausible so the fuzzing reaches
        // the table and tree parsers instead of dying at the root.
        LittleEndian::write_u32(&mut data[pair_address..], ROM_BASE + 0x10);
        LittleEndian::write_u32(&mut data[pair_address + 4..], ROM_BASE + 0x200);
        // A handful of offset entries, then padding.
        for i in 0..8 {
            let offset = rng.gen_range(0x10u16..0x1f0);
            LittleEndian::write_u16(&mut data[0x200 + i * 2..], offset);
        }
        LittleEndian::write_u16(&mut data[0x210..], 0x0000);

        let rom = RomBytes::new(data);
        let params = ForestParams {
            pair_address,
            convention: CONVENTION,
        };
        if let Ok(forest) = TextForest::build(&rom, &params) {
            let start = rng.gen_range(0..rom.len() * 8);
            let result = TextDecoder::new(&forest, &rom, start)
                .with_limit(100)
                .decode_string();
            if let Ok(s) = result {
                assert!(s.len() <= 100);
            }
        }
    }
}
