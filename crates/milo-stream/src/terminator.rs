use crate::error::{StreamError, StreamResult};
use crate::stream::BinaryStream;

impl BinaryStream {
    /// Read four bytes and require them to be the terminator.
    ///
    /// The comparison value depends on the current byte order; the physical
    /// bytes are `AD DE AD DE` either way.
    pub fn read_terminator(&mut self) -> StreamResult<()> {
        let offset = self.position();
        let expected = self.endian().terminator_value();
        let found = self.read_u32()?;
        if found != expected {
            return Err(StreamError::MissingTerminator {
                offset,
                expected,
                found,
            });
        }
        Ok(())
    }

    pub fn write_terminator(&mut self) -> StreamResult<()> {
        self.write_u32(self.endian().terminator_value())
    }
}
