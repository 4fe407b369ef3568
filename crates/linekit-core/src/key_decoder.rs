//! Mapping from raw terminal byte runs to logical keys.
//!
//! The decoder works on whole chunks as they come back from a single read:
//! a chunk either equals one of the known control sequences exactly, or it is
//! literal text. The table is sorted once, longest sequence first, so that
//! lookups and the sanitizer never let a short sequence shadow a longer one
//! that contains it.

use crate::key::Key;
use std::sync::OnceLock;

/// One entry of the control sequence table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsciiCode {
    pub key: Key,
    pub bytes: &'static [u8],
}

const fn code(key: Key, bytes: &'static [u8]) -> AsciiCode {
    AsciiCode { key, bytes }
}

/// Known control sequences in definition order.
///
/// Some byte runs are listed twice (`ESC [ 1 ~` is both Home and F17). The
/// first definition wins.
const ASCII_SEQUENCES: &[AsciiCode] = &[
    code(Key::Escape, &[0x1b]),
    code(Key::ControlSpace, &[0x00]),
    code(Key::ControlA, &[0x01]),
    code(Key::ControlB, &[0x02]),
    code(Key::ControlC, &[0x03]),
    code(Key::ControlD, &[0x04]),
    code(Key::ControlE, &[0x05]),
    code(Key::ControlF, &[0x06]),
    code(Key::ControlG, &[0x07]),
    code(Key::ControlH, &[0x08]),
    code(Key::ControlK, &[0x0b]),
    code(Key::ControlL, &[0x0c]),
    code(Key::ControlM, &[0x0d]),
    code(Key::ControlN, &[0x0e]),
    code(Key::ControlO, &[0x0f]),
    code(Key::ControlP, &[0x10]),
    code(Key::ControlQ, &[0x11]),
    code(Key::ControlR, &[0x12]),
    code(Key::ControlS, &[0x13]),
    code(Key::ControlT, &[0x14]),
    code(Key::ControlU, &[0x15]),
    code(Key::ControlV, &[0x16]),
    code(Key::ControlW, &[0x17]),
    code(Key::ControlX, &[0x18]),
    code(Key::ControlY, &[0x19]),
    code(Key::ControlZ, &[0x1a]),
    code(Key::ControlBackslash, &[0x1c]),
    code(Key::ControlSquareClose, &[0x1d]),
    code(Key::ControlCircumflex, &[0x1e]),
    code(Key::ControlUnderscore, &[0x1f]),
    code(Key::Backspace, &[0x7f]),
    code(Key::AltEnter, &[0x1b, 0x0d]),
    code(Key::Up, &[0x1b, 0x5b, 0x41]),
    code(Key::Down, &[0x1b, 0x5b, 0x42]),
    code(Key::Right, &[0x1b, 0x5b, 0x43]),
    code(Key::Left, &[0x1b, 0x5b, 0x44]),
    code(Key::Home, &[0x1b, 0x5b, 0x48]),
    code(Key::Home, &[0x1b, 0x30, 0x48]),
    code(Key::End, &[0x1b, 0x5b, 0x46]),
    code(Key::End, &[0x1b, 0x30, 0x46]),
    code(Key::Enter, &[0x0a]),
    code(Key::Delete, &[0x1b, 0x5b, 0x33, 0x7e]),
    code(Key::ShiftDelete, &[0x1b, 0x5b, 0x33, 0x3b, 0x32, 0x7e]),
    code(Key::ControlDelete, &[0x1b, 0x5b, 0x33, 0x3b, 0x35, 0x7e]),
    code(Key::Home, &[0x1b, 0x5b, 0x31, 0x7e]),
    code(Key::End, &[0x1b, 0x5b, 0x34, 0x7e]),
    code(Key::PageUp, &[0x1b, 0x5b, 0x35, 0x7e]),
    code(Key::PageDown, &[0x1b, 0x5b, 0x36, 0x7e]),
    code(Key::Home, &[0x1b, 0x5b, 0x37, 0x7e]),
    code(Key::End, &[0x1b, 0x5b, 0x38, 0x7e]),
    code(Key::Tab, &[0x09]),
    code(Key::BackTab, &[0x1b, 0x5b, 0x5a]),
    code(Key::Insert, &[0x1b, 0x5b, 0x32, 0x7e]),
    code(Key::F1, &[0x1b, 0x4f, 0x50]),
    code(Key::F2, &[0x1b, 0x4f, 0x51]),
    code(Key::F3, &[0x1b, 0x4f, 0x52]),
    code(Key::F4, &[0x1b, 0x4f, 0x53]),
    // Linux console
    code(Key::F1, &[0x1b, 0x4f, 0x50, 0x41]),
    code(Key::F2, &[0x1b, 0x5b, 0x5b, 0x42]),
    code(Key::F3, &[0x1b, 0x5b, 0x5b, 0x43]),
    code(Key::F4, &[0x1b, 0x5b, 0x5b, 0x44]),
    code(Key::F5, &[0x1b, 0x5b, 0x5b, 0x45]),
    // rxvt-unicode
    code(Key::F1, &[0x1b, 0x5b, 0x11, 0x7e]),
    code(Key::F2, &[0x1b, 0x5b, 0x12, 0x7e]),
    code(Key::F3, &[0x1b, 0x5b, 0x13, 0x7e]),
    code(Key::F4, &[0x1b, 0x5b, 0x14, 0x7e]),
    code(Key::F5, &[0x1b, 0x5b, 0x31, 0x35, 0x7e]),
    code(Key::F6, &[0x1b, 0x5b, 0x31, 0x37, 0x7e]),
    code(Key::F7, &[0x1b, 0x5b, 0x31, 0x38, 0x7e]),
    code(Key::F8, &[0x1b, 0x5b, 0x31, 0x39, 0x7e]),
    code(Key::F9, &[0x1b, 0x5b, 0x32, 0x30, 0x7e]),
    code(Key::F10, &[0x1b, 0x5b, 0x32, 0x31, 0x7e]),
    code(Key::F11, &[0x1b, 0x5b, 0x32, 0x32, 0x7e]),
    code(Key::F12, &[0x1b, 0x5b, 0x32, 0x34, 0x7e, 0x08]),
    code(Key::F13, &[0x1b, 0x5b, 0x25, 0x7e]),
    code(Key::F14, &[0x1b, 0x5b, 0x26, 0x7e]),
    code(Key::F15, &[0x1b, 0x5b, 0x28, 0x7e]),
    code(Key::F16, &[0x1b, 0x5b, 0x29, 0x7e]),
    code(Key::F17, &[0x1b, 0x5b, 0x31, 0x7e]),
    code(Key::F18, &[0x1b, 0x5b, 0x32, 0x7e]),
    code(Key::F19, &[0x1b, 0x5b, 0x33, 0x7e]),
    code(Key::F20, &[0x1b, 0x5b, 0x34, 0x7e]),
    // xterm. F15 is left out because its sequence collides with a CPR response.
    code(Key::F13, &[0x1b, 0x5b, 0x31, 0x3b, 0x32, 0x50]),
    code(Key::F14, &[0x1b, 0x5b, 0x31, 0x3b, 0x32, 0x51]),
    code(Key::F16, &[0x1b, 0x5b, 0x31, 0x3b, 0x32, 0x52]),
    code(Key::F17, &[0x1b, 0x5b, 0x15, 0x3b, 0x32, 0x7e]),
    code(Key::F18, &[0x1b, 0x5b, 0x17, 0x3b, 0x32, 0x7e]),
    code(Key::F19, &[0x1b, 0x5b, 0x18, 0x3b, 0x32, 0x7e]),
    code(Key::F20, &[0x1b, 0x5b, 0x19, 0x3b, 0x32, 0x7e]),
    code(Key::F21, &[0x1b, 0x5b, 0x20, 0x3b, 0x32, 0x7e]),
    code(Key::F22, &[0x1b, 0x5b, 0x21, 0x3b, 0x32, 0x7e]),
    code(Key::F23, &[0x1b, 0x5b, 0x23, 0x3b, 0x32, 0x7e]),
    code(Key::F24, &[0x1b, 0x5b, 0x24, 0x3b, 0x32, 0x7e]),
    code(Key::ControlUp, &[0x1b, 0x5b, 0x31, 0x3b, 0x35, 0x41]),
    code(Key::ControlDown, &[0x1b, 0x5b, 0x31, 0x3b, 0x35, 0x42]),
    code(Key::ControlRight, &[0x1b, 0x5b, 0x31, 0x3b, 0x35, 0x43]),
    code(Key::ControlLeft, &[0x1b, 0x5b, 0x31, 0x3b, 0x35, 0x44]),
    code(Key::ShiftUp, &[0x1b, 0x5b, 0x31, 0x3b, 0x32, 0x41]),
    code(Key::ShiftDown, &[0x1b, 0x5b, 0x31, 0x3b, 0x32, 0x42]),
    code(Key::ShiftRight, &[0x1b, 0x5b, 0x31, 0x3b, 0x32, 0x43]),
    code(Key::ShiftLeft, &[0x1b, 0x5b, 0x31, 0x3b, 0x32, 0x44]),
    // tmux sends these for Control+arrow, Emacs ansi-term for plain arrows.
    // Plain arrows win.
    code(Key::Up, &[0x1b, 0x4f, 0x41]),
    code(Key::Down, &[0x1b, 0x4f, 0x42]),
    code(Key::Right, &[0x1b, 0x4f, 0x43]),
    code(Key::Left, &[0x1b, 0x4f, 0x44]),
    code(Key::ControlUp, &[0x1b, 0x5b, 0x35, 0x41]),
    code(Key::ControlDown, &[0x1b, 0x5b, 0x35, 0x42]),
    code(Key::ControlRight, &[0x1b, 0x5b, 0x35, 0x43]),
    code(Key::ControlLeft, &[0x1b, 0x5b, 0x35, 0x44]),
    // rxvt
    code(Key::ControlRight, &[0x1b, 0x5b, 0x4f, 0x63]),
    code(Key::ControlLeft, &[0x1b, 0x5b, 0x4f, 0x64]),
    // xterm and Linux console
    code(Key::Ignore, &[0x1b, 0x5b, 0x45]),
    code(Key::Ignore, &[0x1b, 0x5b, 0x46]),
];

static SORTED_SEQUENCES: OnceLock<Vec<AsciiCode>> = OnceLock::new();

/// The control sequence table, longest byte run first.
///
/// Sorting happens on first use and is stable, so entries of equal length
/// keep their definition order.
pub fn ascii_sequences() -> &'static [AsciiCode] {
    SORTED_SEQUENCES.get_or_init(|| {
        let mut sorted = ASCII_SEQUENCES.to_vec();
        sorted.sort_by(|a, b| b.bytes.len().cmp(&a.bytes.len()));
        log::trace!("sorted {} control sequences", sorted.len());
        sorted
    })
}

/// Decode one chunk of raw input.
///
/// Returns [`Key::NotDefined`] when the chunk matches no table entry, which
/// means the bytes are literal text.
///
/// # Examples
///
/// ```
/// use linekit_core::key_decoder::get_key;
/// use linekit_core::Key;
///
/// assert_eq!(get_key(&[0x1b]), Key::Escape);
/// assert_eq!(get_key(&[0x1b, 0x5b, 0x42]), Key::Down);
/// assert_eq!(get_key(b"a"), Key::NotDefined);
/// ```
pub fn get_key(bytes: &[u8]) -> Key {
    ascii_sequences()
        .iter()
        .find(|code| code.bytes == bytes)
        .map(|code| code.key)
        .unwrap_or(Key::NotDefined)
}

/// Strip every known control sequence out of `input`, keeping line feeds and
/// carriage returns.
///
/// # Examples
///
/// ```
/// use linekit_core::key_decoder::remove_ascii_sequences;
///
/// let cleaned = remove_ascii_sequences(b"ab\x1b[Ac\nd\x7f");
/// assert_eq!(cleaned, b"abc\nd".to_vec());
/// ```
pub fn remove_ascii_sequences(input: &[u8]) -> Vec<u8> {
    let mut output = input.to_vec();
    for code in ascii_sequences() {
        if matches!(code.key, Key::Enter | Key::ControlM) {
            continue;
        }
        if output.len() >= code.bytes.len() {
            output = replace_all(&output, code.bytes);
        }
    }
    output
}

fn replace_all(haystack: &[u8], needle: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_get_key_single_bytes() {
        assert_eq!(get_key(&[0x1b]), Key::Escape);
        assert_eq!(get_key(&[0x03]), Key::ControlC);
        assert_eq!(get_key(&[0x09]), Key::Tab);
        assert_eq!(get_key(&[0x0a]), Key::Enter);
        assert_eq!(get_key(&[0x0d]), Key::ControlM);
        assert_eq!(get_key(&[0x7f]), Key::Backspace);
    }

    #[test]
    fn test_get_key_undefined() {
        assert_eq!(get_key(b"a"), Key::NotDefined);
        assert_eq!(get_key(b"select"), Key::NotDefined);
        assert_eq!(get_key(&[]), Key::NotDefined);
        assert_eq!(get_key(&[0x1b, 0x5b]), Key::NotDefined);
    }

    #[test]
    fn test_get_key_prefers_longer_sequence() {
        assert_eq!(get_key(&[0x1b, 0x5b, 0x41]), Key::Up);
        assert_eq!(get_key(&[0x1b, 0x0d]), Key::AltEnter);
        assert_eq!(get_key(&[0x1b, 0x4f, 0x50]), Key::F1);
        assert_eq!(get_key(&[0x1b, 0x4f, 0x50, 0x41]), Key::F1);
        assert_eq!(
            get_key(&[0x1b, 0x5b, 0x31, 0x3b, 0x35, 0x41]),
            Key::ControlUp
        );
    }

    #[test]
    fn test_get_key_duplicate_sequence_first_definition_wins() {
        assert_eq!(get_key(&[0x1b, 0x5b, 0x31, 0x7e]), Key::Home);
        assert_eq!(get_key(&[0x1b, 0x5b, 0x32, 0x7e]), Key::Insert);
        assert_eq!(get_key(&[0x1b, 0x5b, 0x33, 0x7e]), Key::Delete);
        assert_eq!(get_key(&[0x1b, 0x5b, 0x34, 0x7e]), Key::End);
    }

    #[test]
    fn test_every_table_entry_decodes() {
        for code in ASCII_SEQUENCES {
            let decoded = get_key(code.bytes);
            let first = ASCII_SEQUENCES
                .iter()
                .find(|c| c.bytes == code.bytes)
                .map(|c| c.key);
            assert_eq!(Some(decoded), first, "sequence {:02x?}", code.bytes);
        }
    }

    #[test]
    fn test_sorted_table_is_longest_first() {
        let sorted = ascii_sequences();
        assert_eq!(sorted.len(), ASCII_SEQUENCES.len());
        for pair in sorted.windows(2) {
            assert!(pair[0].bytes.len() >= pair[1].bytes.len());
        }
    }

    #[test]
    fn test_sorted_table_is_shared_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| ascii_sequences().as_ptr() as usize))
            .collect();
        let ptrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ptrs.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_remove_keeps_line_breaks() {
        let text = "this_is\n\r_a_lon\r\nger_size\r\rd_text_inp\n\nu_f\nor_testi\rg_purposes";
        assert_eq!(remove_ascii_sequences(text.as_bytes()), text.as_bytes().to_vec());
    }

    #[test]
    fn test_remove_strips_escape_sequences() {
        assert_eq!(remove_ascii_sequences(b"\x1b[Ahello\x1b"), b"hello".to_vec());
        assert_eq!(remove_ascii_sequences(b"a\x1b[3;5~b"), b"ab".to_vec());
        assert_eq!(remove_ascii_sequences(b"\x1b\r"), Vec::<u8>::new());
    }

    #[test]
    fn test_remove_keeps_multibyte_text() {
        let text = "日本語\x1b[Bです";
        assert_eq!(remove_ascii_sequences(text.as_bytes()), "日本語です".as_bytes().to_vec());
    }

    fn removable_sequences() -> Vec<&'static [u8]> {
        ASCII_SEQUENCES
            .iter()
            .filter(|c| !matches!(c.key, Key::Enter | Key::ControlM))
            .map(|c| c.bytes)
            .collect()
    }

    proptest! {
        #[test]
        fn test_remove_round_trips_inserted_sequences(
            picks in prop::collection::vec(prop::collection::vec(any::<prop::sample::Index>(), 1..=5), 54)
        ) {
            let text = b"this_is_a_longer_sized_text_input_for_testing_purposes";
            let sequences = removable_sequences();
            let mut input = Vec::new();
            for (ch, picked) in text.iter().zip(picks.iter()) {
                input.push(*ch);
                for index in picked {
                    input.extend_from_slice(sequences[index.index(sequences.len())]);
                }
            }
            prop_assert_eq!(remove_ascii_sequences(&input), text.to_vec());
        }
    }
}
