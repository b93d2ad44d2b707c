//! ToUnicode CMap parsing.
//!
//! Maps character codes of a font to Unicode text using the `bfchar` and
//! `bfrange` sections of an embedded CMap stream.

use std::collections::HashMap;

use crate::error::BackendError;
use crate::tokenizer::{Operand, tokenize};

/// A parsed ToUnicode CMap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToUnicodeMap {
    mappings: HashMap<u32, String>,
    /// Width in bytes of source codes, taken from the first mapping seen.
    code_width: Option<usize>,
}

impl ToUnicodeMap {
    /// Parse CMap stream bytes.
    ///
    /// Sections other than `bfchar`/`bfrange` are ignored.
    pub fn parse(data: &[u8]) -> Result<Self, BackendError> {
        let mut map = Self::default();
        for op in tokenize(data)? {
            match op.name.as_str() {
                "endbfchar" => {
                    for pair in op.operands.chunks_exact(2) {
                        let (Some(src), Some(dst)) = (pair[0].as_bytes(), pair[1].as_bytes())
                        else {
                            continue;
                        };
                        map.insert(src, decode_utf16be(dst));
                    }
                }
                "endbfrange" => {
                    for triple in op.operands.chunks_exact(3) {
                        map.insert_range(&triple[0], &triple[1], &triple[2]);
                    }
                }
                _ => {}
            }
        }
        Ok(map)
    }

    fn note_width(&mut self, src: &[u8]) {
        if self.code_width.is_none() && !src.is_empty() {
            self.code_width = Some(src.len());
        }
    }

    fn insert(&mut self, src: &[u8], text: String) {
        self.note_width(src);
        self.mappings.insert(code_of(src), text);
    }

    fn insert_range(&mut self, lo: &Operand, hi: &Operand, dst: &Operand) {
        let (Some(lo), Some(hi)) = (lo.as_bytes(), hi.as_bytes()) else {
            return;
        };
        self.note_width(lo);
        let (lo, hi) = (code_of(lo), code_of(hi));
        if hi < lo {
            return;
        }
        match dst {
            Operand::Array(items) => {
                for (code, item) in (lo..=hi).zip(items) {
                    if let Some(bytes) = item.as_bytes() {
                        self.mappings.insert(code, decode_utf16be(bytes));
                    }
                }
            }
            Operand::Str(base) => {
                let mut units = utf16_units(base);
                for code in lo..=hi {
                    self.mappings
                        .insert(code, String::from_utf16_lossy(&units));
                    // Ranges increment the last UTF-16 unit.
                    if let Some(last) = units.last_mut() {
                        *last = last.wrapping_add(1);
                    }
                }
            }
            _ => {}
        }
    }

    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    /// Byte width of source codes, when any mapping declared one.
    pub fn code_width(&self) -> Option<usize> {
        self.code_width
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|c| match c {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [b] => u16::from(*b),
            _ => 0,
        })
        .collect()
}

fn decode_utf16be(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&utf16_units(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CMAP: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CMapName /Adobe-Identity-UCS def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 beginbfchar
<0003> <0020>
<0011> <20B9>
endbfchar
2 beginbfrange
<0024> <0026> <0041>
<0030> <0031> [<0066006C> <00E9>]
endbfrange
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

    #[test]
    fn bfchar_mappings() {
        let map = ToUnicodeMap::parse(CMAP).unwrap();
        assert_eq!(map.lookup(0x0003), Some(" "));
        assert_eq!(map.lookup(0x0011), Some("₹"));
        assert_eq!(map.code_width(), Some(2));
    }

    #[test]
    fn bfrange_increments_destination() {
        let map = ToUnicodeMap::parse(CMAP).unwrap();
        assert_eq!(map.lookup(0x0024), Some("A"));
        assert_eq!(map.lookup(0x0025), Some("B"));
        assert_eq!(map.lookup(0x0026), Some("C"));
        assert_eq!(map.lookup(0x0027), None);
    }

    #[test]
    fn bfrange_array_destination() {
        let map = ToUnicodeMap::parse(CMAP).unwrap();
        assert_eq!(map.lookup(0x0030), Some("fl"));
        assert_eq!(map.lookup(0x0031), Some("é"));
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn single_byte_codes() {
        let map = ToUnicodeMap::parse(b"1 beginbfchar <41> <0058> endbfchar").unwrap();
        assert_eq!(map.code_width(), Some(1));
        assert_eq!(map.lookup(0x41), Some("X"));
    }

    #[test]
    fn empty_cmap() {
        let map = ToUnicodeMap::parse(b"begincmap endcmap").unwrap();
        assert!(map.is_empty());
        assert_eq!(map.code_width(), None);
    }
}
