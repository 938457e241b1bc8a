//! Text encoding registry.
//!
//! Property documents carry strings in one of six character sets, identified
//! on the binary side by a 3-bit codepage id and on the XML side by the
//! declaration's `encoding` attribute. ASCII, UTF-8, and the unset encoding
//! perform no byte-level transform; the remaining three transcode between
//! the external bytes and the in-memory UTF-8 strings.

use std::borrow::Cow;
use std::fmt;

use crate::{Error, Result};

/// A supported character set.
#[derive(Debug)]
pub struct Encoding {
    codepage: u8,
    name: &'static str,
    charset: Charset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Charset {
    /// No byte-level transform (None, ASCII, UTF-8).
    Transparent,
    Latin1,
    EucJp,
    ShiftJis,
}

/// No encoding declared.
pub static NONE: Encoding = Encoding { codepage: 0, name: "", charset: Charset::Transparent };
/// 7-bit ASCII.
pub static ASCII: Encoding = Encoding { codepage: 1, name: "ASCII", charset: Charset::Transparent };
/// ISO-8859-1 (Latin-1), mapped 1:1 to U+0000..U+00FF.
pub static ISO_8859_1: Encoding =
    Encoding { codepage: 2, name: "ISO-8859-1", charset: Charset::Latin1 };
/// EUC-JP.
pub static EUC_JP: Encoding = Encoding { codepage: 3, name: "EUC-JP", charset: Charset::EucJp };
/// Shift_JIS.
pub static SHIFT_JIS: Encoding =
    Encoding { codepage: 4, name: "SHIFT_JIS", charset: Charset::ShiftJis };
/// UTF-8.
pub static UTF_8: Encoding = Encoding { codepage: 5, name: "UTF-8", charset: Charset::Transparent };

// Indexed by codepage id; order matters.
static BY_CODEPAGE: [&Encoding; 6] = [&NONE, &ASCII, &ISO_8859_1, &EUC_JP, &SHIFT_JIS, &UTF_8];

impl Encoding {
    /// The codepage id stored in binary headers.
    pub fn codepage(&self) -> u8 {
        self.codepage
    }

    /// The canonical name written to XML declarations. Empty for [`NONE`].
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look up an encoding by codepage id.
    pub fn by_codepage(id: u8) -> Option<&'static Encoding> {
        BY_CODEPAGE.get(id as usize).copied()
    }

    /// Look up an encoding by name, accepting common aliases.
    /// Matching is case-insensitive.
    pub fn by_name(name: &str) -> Option<&'static Encoding> {
        match name.to_ascii_uppercase().as_str() {
            "" | "NONE" => Some(&NONE),
            "ASCII" => Some(&ASCII),
            "ISO-8859-1" | "ISO_8859-1" => Some(&ISO_8859_1),
            "EUC-JP" | "EUC_JP" | "EUCJP" => Some(&EUC_JP),
            "SHIFT_JIS" | "SHIFT-JIS" | "SJIS" => Some(&SHIFT_JIS),
            "UTF-8" | "UTF8" => Some(&UTF_8),
            _ => None,
        }
    }

    /// Decode external bytes into a string.
    ///
    /// Decoding is lenient: byte sequences that are invalid in the charset
    /// come out as replacement characters rather than failing the read.
    pub(crate) fn decode(&self, bytes: &[u8]) -> String {
        match self.charset {
            Charset::Transparent => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            Charset::EucJp => {
                encoding_rs::EUC_JP.decode_without_bom_handling(bytes).0.into_owned()
            }
            Charset::ShiftJis => {
                encoding_rs::SHIFT_JIS.decode_without_bom_handling(bytes).0.into_owned()
            }
        }
    }

    /// Encode a string into external bytes.
    ///
    /// Encoding is strict: characters the charset cannot represent are an
    /// error, not a silent substitution.
    pub(crate) fn encode<'a>(&self, s: &'a str) -> Result<Cow<'a, [u8]>> {
        match self.charset {
            Charset::Transparent => Ok(Cow::Borrowed(s.as_bytes())),
            Charset::Latin1 => {
                let mut out = Vec::with_capacity(s.len());
                for ch in s.chars() {
                    let cp = ch as u32;
                    if cp > 0xFF {
                        return Err(Error::Unencodable(self.name));
                    }
                    out.push(cp as u8);
                }
                Ok(Cow::Owned(out))
            }
            Charset::EucJp => {
                let (out, _, had_errors) = encoding_rs::EUC_JP.encode(s);
                if had_errors {
                    return Err(Error::Unencodable(self.name));
                }
                Ok(out)
            }
            Charset::ShiftJis => {
                let (out, _, had_errors) = encoding_rs::SHIFT_JIS.encode(s);
                if had_errors {
                    return Err(Error::Unencodable(self.name));
                }
                Ok(out)
            }
        }
    }
}

impl PartialEq for Encoding {
    fn eq(&self, other: &Self) -> bool {
        self.codepage == other.codepage
    }
}

impl Eq for Encoding {}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "None")
        } else {
            write!(f, "{}", self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codepage_lookup() {
        for (id, enc) in BY_CODEPAGE.iter().enumerate() {
            assert_eq!(enc.codepage() as usize, id);
            assert_eq!(Encoding::by_codepage(id as u8), Some(*enc));
        }
        assert_eq!(Encoding::by_codepage(6), None);
    }

    #[test]
    fn test_name_aliases() {
        assert_eq!(Encoding::by_name("utf8"), Some(&UTF_8));
        assert_eq!(Encoding::by_name("UTF-8"), Some(&UTF_8));
        assert_eq!(Encoding::by_name("sjis"), Some(&SHIFT_JIS));
        assert_eq!(Encoding::by_name("Shift-JIS"), Some(&SHIFT_JIS));
        assert_eq!(Encoding::by_name("eucjp"), Some(&EUC_JP));
        assert_eq!(Encoding::by_name("ISO_8859-1"), Some(&ISO_8859_1));
        assert_eq!(Encoding::by_name(""), Some(&NONE));
        assert_eq!(Encoding::by_name("KOI8-R"), None);
    }

    #[test]
    fn test_latin1_roundtrip() {
        let bytes: Vec<u8> = (0x20..=0xFF).collect();
        let s = ISO_8859_1.decode(&bytes);
        assert_eq!(ISO_8859_1.encode(&s).unwrap().as_ref(), bytes.as_slice());

        assert!(matches!(ISO_8859_1.encode("日本語"), Err(Error::Unencodable(_))));
    }

    #[test]
    fn test_japanese_charsets() {
        // "あ" in each charset
        assert_eq!(SHIFT_JIS.encode("あ").unwrap().as_ref(), &[0x82, 0xA0]);
        assert_eq!(EUC_JP.encode("あ").unwrap().as_ref(), &[0xA4, 0xA2]);
        assert_eq!(SHIFT_JIS.decode(&[0x82, 0xA0]), "あ");
        assert_eq!(EUC_JP.decode(&[0xA4, 0xA2]), "あ");
    }

    #[test]
    fn test_transparent_passthrough() {
        assert_eq!(UTF_8.encode("héllo").unwrap().as_ref(), "héllo".as_bytes());
        assert_eq!(NONE.decode("héllo".as_bytes()), "héllo");
    }
}
