//! Documents handed to the scanner.

use std::fmt;
use std::io::{Cursor, Read};

/// Where the characters of a source come from.
pub enum InputData {
    /// Raw bytes; the scanner picks the encoding.
    Bytes(Box<dyn Read>),
    /// Already decoded text; encoding sniffing is skipped.
    Text(String),
}

impl fmt::Debug for InputData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(_) => f.write_str("Bytes(..)"),
            Self::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
        }
    }
}

/// A document plus the identifiers that describe it.
#[derive(Debug)]
pub struct InputSource {
    /// Content.
    pub data: InputData,
    /// Declared encoding label. Overrides BOM sniffing for byte input.
    pub encoding: Option<String>,
    /// Public identifier.
    pub public_id: Option<String>,
    /// Base for resolving `system_id`.
    pub base_system_id: Option<String>,
    /// System identifier, usually a file name or URL.
    pub system_id: Option<String>,
}

impl InputSource {
    fn with_data(data: InputData) -> Self {
        Self {
            data,
            encoding: None,
            public_id: None,
            base_system_id: None,
            system_id: None,
        }
    }

    /// Source reading bytes from `reader`.
    pub fn from_reader(reader: impl Read + 'static) -> Self {
        Self::with_data(InputData::Bytes(Box::new(reader)))
    }

    /// Source over an owned byte buffer.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::from_reader(Cursor::new(bytes.into()))
    }

    /// Source over decoded text.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::with_data(InputData::Text(text.into()))
    }

    /// Declare the input encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Set the public identifier.
    #[must_use]
    pub fn with_public_id(mut self, public_id: impl Into<String>) -> Self {
        self.public_id = Some(public_id.into());
        self
    }

    /// Set the system identifier and the base it is resolved against.
    #[must_use]
    pub fn with_system_id(
        mut self,
        system_id: impl Into<String>,
        base_system_id: Option<String>,
    ) -> Self {
        self.system_id = Some(system_id.into());
        self.base_system_id = base_system_id;
        self
    }
}
