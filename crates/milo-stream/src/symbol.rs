//! Symbol codec.
//!
//! On the wire a symbol is a `u32` byte count in the stream byte order,
//! followed by one byte per character. Bytes map to characters one-to-one
//! (U+0000..=U+00FF), so every byte sequence decodes and re-encodes exactly.

use milo_types::Symbol;

use crate::error::{StreamError, StreamResult};
use crate::stream::BinaryStream;

impl BinaryStream {
    /// Read one symbol, rejecting lengths above the stream's symbol ceiling.
    pub fn read_symbol(&mut self) -> StreamResult<Symbol> {
        let len = self.read_count("symbol length", self.max_symbol_len())?;
        let bytes = self.read_bytes(len as usize)?;
        Ok(Symbol::new(decode_bytes(&bytes)))
    }

    /// Write one symbol under the same length ceiling `read_symbol` enforces.
    pub fn write_symbol(&mut self, symbol: &Symbol) -> StreamResult<()> {
        let bytes = encode_text(symbol.as_str()).ok_or_else(|| StreamError::UnencodableSymbol {
            text: symbol.to_string(),
        })?;
        self.write_count("symbol length", bytes.len(), self.max_symbol_len())?;
        self.write_bytes(&bytes)
    }

    /// Read a `u32`-counted list of symbols with a fixed ceiling on the count.
    pub fn read_symbol_list(&mut self, what: &'static str, max: u32) -> StreamResult<Vec<Symbol>> {
        let count = self.read_count(what, max)?;
        let mut symbols = Vec::with_capacity(count as usize);
        for _ in 0..count {
            symbols.push(self.read_symbol()?);
        }
        Ok(symbols)
    }

    pub fn write_symbol_list(
        &mut self,
        what: &'static str,
        symbols: &[Symbol],
        max: u32,
    ) -> StreamResult<()> {
        self.write_count(what, symbols.len(), max)?;
        for symbol in symbols {
            self.write_symbol(symbol)?;
        }
        Ok(())
    }
}

fn decode_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn encode_text(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(c).ok()).collect()
}
