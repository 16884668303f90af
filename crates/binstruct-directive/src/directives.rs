use std::fmt;
use std::str::FromStr;

use crate::error::{DirectiveError, Result};

bitflags::bitflags! {
    /// Framing bits for one directive plane.
    ///
    /// The same set is used for a field's own plane and for its element plane.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Framing: u8 {
        /// No count prefix before a collection's elements.
        const COUNT0 = 0b0000_0001;
        /// 2-byte little-endian count prefix instead of the default 1 byte.
        const COUNT16 = 0b0000_0010;
        /// Wrap the encoded value in a 4-byte little-endian byte-length block.
        const LEN32 = 0b0000_0100;
        /// On decode, stop the enclosing record cleanly if no bytes remain.
        const END = 0b0000_1000;
    }
}

/// Token spelling for each framing bit, in canonical order.
const FRAMING_TOKENS: [(Framing, &str); 4] = [
    (Framing::COUNT0, "count0"),
    (Framing::COUNT16, "count16"),
    (Framing::LEN32, "len32"),
    (Framing::END, "end"),
];

/// Parsed directives for a single field.
///
/// `own` governs the field itself; `element` governs each element when the
/// field is a collection. The planes only meet through [`Directives::element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Directives {
    skip: bool,
    own: Framing,
    element: Framing,
}

impl Directives {
    /// No directives: default framing everywhere.
    pub const NONE: Directives = Directives {
        skip: false,
        own: Framing::empty(),
        element: Framing::empty(),
    };

    /// Build directives from explicit planes.
    pub const fn new(skip: bool, own: Framing, element: Framing) -> Self {
        Self { skip, own, element }
    }

    /// Build directives from raw plane bits; unknown bits are dropped.
    ///
    /// Used by generated code to embed directives parsed at compile time.
    pub const fn from_bits(skip: bool, own: u8, element: u8) -> Self {
        Self {
            skip,
            own: Framing::from_bits_truncate(own),
            element: Framing::from_bits_truncate(element),
        }
    }

    /// Parse a comma-separated directive string.
    ///
    /// Empty tokens are ignored, so `""` and `","` both yield [`Directives::NONE`].
    pub fn parse(s: &str) -> Result<Self> {
        let mut directives = Self::NONE;
        for token in s.split(',').filter(|t| !t.is_empty()) {
            if token == "-" {
                directives.skip = true;
                continue;
            }

            let (plane, name) = match token
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                Some(inner) => (&mut directives.element, inner),
                None => (&mut directives.own, token),
            };

            let bit = FRAMING_TOKENS
                .iter()
                .find(|(_, spelling)| *spelling == name)
                .map(|(bit, _)| *bit)
                .ok_or_else(|| DirectiveError::UnknownToken(token.to_string()))?;
            plane.insert(bit);
        }
        Ok(directives)
    }

    /// The field is excluded from the wire form.
    pub const fn is_skipped(&self) -> bool {
        self.skip
    }

    /// Framing bits for the field itself.
    pub const fn own(&self) -> Framing {
        self.own
    }

    /// Framing bits for each element of a collection field.
    pub const fn element_framing(&self) -> Framing {
        self.element
    }

    /// Directives to apply to each element of a collection field.
    ///
    /// The element plane becomes the element's own plane; the element has no
    /// element plane of its own and is never skipped.
    pub const fn element(&self) -> Directives {
        Directives {
            skip: false,
            own: self.element,
            element: Framing::empty(),
        }
    }

    /// The same directives with the length block bit cleared on the own plane.
    pub const fn without_block(&self) -> Directives {
        Directives {
            skip: self.skip,
            own: self.own.difference(Framing::LEN32),
            element: self.element,
        }
    }

    pub const fn count_omitted(&self) -> bool {
        self.own.contains(Framing::COUNT0)
    }

    pub const fn count16(&self) -> bool {
        self.own.contains(Framing::COUNT16)
    }

    pub const fn is_block(&self) -> bool {
        self.own.contains(Framing::LEN32)
    }

    pub const fn is_optional_end(&self) -> bool {
        self.own.contains(Framing::END)
    }
}

impl FromStr for Directives {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Directives {
    /// Renders the canonical token list; parsing it yields the same value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens: Vec<String> = Vec::new();
        if self.skip {
            tokens.push("-".to_string());
        }
        for (bit, spelling) in FRAMING_TOKENS {
            if self.own.contains(bit) {
                tokens.push(spelling.to_string());
            }
        }
        for (bit, spelling) in FRAMING_TOKENS {
            if self.element.contains(bit) {
                tokens.push(format!("[{spelling}]"));
            }
        }
        f.write_str(&tokens.join(","))
    }
}
