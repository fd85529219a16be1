//! AML Name Grammar
//!
//! Parses encoded NameStrings and renders them for diagnostics.
//! This layer is structural only; resolution against a namespace lives with the host.

use std::fmt;

use crate::error::{AmlError, AmlResult};

const ROOT_CHAR: u8 = b'\\';
const PARENT_PREFIX_CHAR: u8 = b'^';
const DUAL_NAME_PREFIX: u8 = 0x2E;
const MULTI_NAME_PREFIX: u8 = 0x2F;
const NULL_NAME: u8 = 0x00;

/// A MultiNamePath carries its segment count in one byte.
pub const MAX_SEGMENTS: usize = u8::MAX as usize;

/// Four-character name component, right-padded with `_`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameSeg(pub [u8; 4]);

impl NameSeg {
    /// Validate four raw bytes as a segment
    pub fn new(bytes: [u8; 4]) -> AmlResult<Self> {
        if !is_lead_name_char(bytes[0]) {
            return Err(AmlError::MalformedName { offset: 0 });
        }
        if let Some(i) = bytes[1..].iter().position(|&b| !is_name_char(b)) {
            return Err(AmlError::MalformedName { offset: i + 1 });
        }
        Ok(NameSeg(bytes))
    }

    /// Build a segment from its textual form, padding short names with `_`
    pub fn from_text(text: &str) -> AmlResult<Self> {
        let raw = text.as_bytes();
        if raw.is_empty() || raw.len() > 4 {
            return Err(AmlError::MalformedName { offset: raw.len().min(4) });
        }
        let mut bytes = [b'_'; 4];
        bytes[..raw.len()].copy_from_slice(raw);
        Self::new(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for NameSeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Padding is dropped, but the lead character always survives.
        let mut end = 4;
        while end > 1 && self.0[end - 1] == b'_' {
            end -= 1;
        }
        for &b in &self.0[..end] {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

fn is_lead_name_char(b: u8) -> bool {
    b.is_ascii_uppercase() || b == b'_'
}

fn is_name_char(b: u8) -> bool {
    is_lead_name_char(b) || b.is_ascii_digit()
}

/// Parsed NameString
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmlName {
    absolute: bool,
    height: usize,
    segments: Vec<NameSeg>,
}

impl AmlName {
    /// Build a name from already validated parts
    ///
    /// # Panics
    ///
    /// If there are more than `MAX_SEGMENTS` segments, which no encoded
    /// NameString can express.
    pub fn new(absolute: bool, height: usize, segments: Vec<NameSeg>) -> Self {
        assert!(
            segments.len() <= MAX_SEGMENTS,
            "name has {} segments, at most {} can be encoded",
            segments.len(),
            MAX_SEGMENTS
        );
        // A rooted name cannot also climb.
        let height = if absolute { 0 } else { height };
        AmlName {
            absolute,
            height,
            segments,
        }
    }

    /// Parse an encoded NameString.
    ///
    /// Returns the name and the number of bytes consumed, so callers that
    /// embed names in a larger stream can continue after it.
    pub fn parse(bytes: &[u8]) -> AmlResult<(AmlName, usize)> {
        let mut cursor = 0;
        let mut absolute = false;
        let mut height = 0;

        // Prefix
        if Self::peek(bytes, cursor)? == ROOT_CHAR {
            absolute = true;
            cursor += 1;
        } else {
            while Self::peek(bytes, cursor)? == PARENT_PREFIX_CHAR {
                height += 1;
                cursor += 1;
            }
        }

        // Name path
        let count = match Self::peek(bytes, cursor)? {
            NULL_NAME => {
                cursor += 1;
                0
            }
            DUAL_NAME_PREFIX => {
                cursor += 1;
                2
            }
            MULTI_NAME_PREFIX => {
                cursor += 1;
                let n = Self::peek(bytes, cursor)? as usize;
                if n == 0 {
                    return Err(AmlError::MalformedName { offset: cursor });
                }
                cursor += 1;
                n
            }
            _ => 1,
        };

        let mut segments = Vec::with_capacity(count);
        for _ in 0..count {
            segments.push(Self::read_seg(bytes, &mut cursor)?);
        }

        Ok((
            AmlName {
                absolute,
                height,
                segments,
            },
            cursor,
        ))
    }

    /// Parse the textual form used in diagnostics, e.g. `\_SB.PCI0` or `^^FOO`
    pub fn from_path(path: &str) -> AmlResult<AmlName> {
        let mut rest = path;
        let mut absolute = false;
        let mut height = 0;

        if let Some(r) = rest.strip_prefix('\\') {
            absolute = true;
            rest = r;
        } else {
            while let Some(r) = rest.strip_prefix('^') {
                height += 1;
                rest = r;
            }
        }

        let mut segments = Vec::new();
        if !rest.is_empty() {
            let mut offset = path.len() - rest.len();
            for part in rest.split('.') {
                if segments.len() == MAX_SEGMENTS {
                    return Err(AmlError::MalformedName { offset });
                }
                let seg = NameSeg::from_text(part).map_err(|e| match e {
                    AmlError::MalformedName { offset: o } => {
                        AmlError::MalformedName { offset: offset + o }
                    }
                    other => other,
                })?;
                segments.push(seg);
                offset += part.len() + 1;
            }
        }

        Ok(AmlName {
            absolute,
            height,
            segments,
        })
    }

    /// Encode back into the AML byte form
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.height + self.segments.len() * 4);
        if self.absolute {
            out.push(ROOT_CHAR);
        }
        out.extend(std::iter::repeat(PARENT_PREFIX_CHAR).take(self.height));
        match self.segments.len() {
            0 => out.push(NULL_NAME),
            1 => {}
            2 => out.push(DUAL_NAME_PREFIX),
            n => {
                out.push(MULTI_NAME_PREFIX);
                out.push(n as u8);
            }
        }
        for seg in &self.segments {
            out.extend_from_slice(seg.as_bytes());
        }
        out
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// Number of `^` prefixes
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn segments(&self) -> &[NameSeg] {
        &self.segments
    }

    pub fn is_null(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the upward scope search rules apply to this name
    pub fn search_scopes(&self) -> bool {
        !self.absolute && self.height == 0 && self.segments.len() == 1
    }

    fn peek(bytes: &[u8], cursor: usize) -> AmlResult<u8> {
        bytes
            .get(cursor)
            .copied()
            .ok_or(AmlError::MalformedName { offset: cursor })
    }

    fn read_seg(bytes: &[u8], cursor: &mut usize) -> AmlResult<NameSeg> {
        if *cursor + 4 > bytes.len() {
            return Err(AmlError::MalformedName { offset: bytes.len() });
        }
        let raw = [
            bytes[*cursor],
            bytes[*cursor + 1],
            bytes[*cursor + 2],
            bytes[*cursor + 3],
        ];
        let seg = NameSeg::new(raw).map_err(|e| match e {
            AmlError::MalformedName { offset } => AmlError::MalformedName {
                offset: *cursor + offset,
            },
            other => other,
        })?;
        *cursor += 4;
        Ok(seg)
    }
}

impl fmt::Display for AmlName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            write!(f, "\\")?;
        }
        for _ in 0..self.height {
            write!(f, "^")?;
        }
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}
