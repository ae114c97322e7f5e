use std::path::Path;

use milo_stream::BinaryStream;
use tracing::{debug, warn};

use crate::config::SceneConfig;
use crate::directory::Directory;
use crate::error::SceneResult;
use crate::registry::Registry;

/// Decoder/encoder for whole scene files.
///
/// Holds no per-call state, so one codec can serve many threads; each call
/// owns its own stream.
#[derive(Debug)]
pub struct SceneCodec {
    registry: Registry,
    config: SceneConfig,
}

impl SceneCodec {
    pub fn new(registry: Registry, config: SceneConfig) -> Self {
        Self { registry, config }
    }

    /// Built-in schemas with the default configuration.
    pub fn builtin() -> Self {
        Self::new(Registry::builtin(), SceneConfig::default())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Decode a root directory. Bytes after it are reported, not rejected.
    pub fn decode(&self, bytes: impl Into<Vec<u8>>) -> SceneResult<Directory> {
        let mut stream = self.config.stream_for(bytes.into());
        let dir = self.decode_stream(&mut stream)?;
        if !stream.is_at_end() {
            warn!(
                offset = stream.position(),
                trailing = stream.remaining(),
                "trailing bytes after root directory"
            );
        }
        Ok(dir)
    }

    /// Decode one directory at the stream's current position.
    pub fn decode_stream(&self, stream: &mut BinaryStream) -> SceneResult<Directory> {
        Directory::read(stream, &self.registry, &self.config.limits)
    }

    pub fn encode(&self, dir: &Directory) -> SceneResult<Vec<u8>> {
        let mut stream = BinaryStream::new()
            .with_revision_split(self.config.revision_split)
            .with_max_symbol_len(self.config.limits.max_symbol_len);
        dir.write(&mut stream, &self.registry, &self.config.limits)?;
        Ok(stream.into_bytes())
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> SceneResult<Directory> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!(path = %path.display(), len = bytes.len(), "decoding scene file");
        self.decode(bytes)
    }

    pub fn write_file(&self, path: impl AsRef<Path>, dir: &Directory) -> SceneResult<()> {
        let bytes = self.encode(dir)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Default for SceneCodec {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milo_stream::StreamError;
    use milo_types::{Endian, RevisionSplit, VersionTag, TERMINATOR};

    use crate::catalog::{BAND_SONG_PREF, OBJECT_DIR, WORLD_DIR};
    use crate::entry::Entry;
    use crate::error::SceneError;
    use crate::field::FieldValue;

    fn sample() -> Directory {
        let mut root = Directory::new(
            28,
            "venue",
            WORLD_DIR.blank(VersionTag::primary(23), 28).unwrap(),
        );
        root.push(Entry::typed(
            "song.pref",
            BAND_SONG_PREF
                .blank(VersionTag::primary(1), 28)
                .unwrap()
                .with_field("part4_instrument", FieldValue::Symbol("vocals".into())),
        ));
        root.push(Entry::raw("FutureType", "blob", vec![0xAD, 0xDE, 0xAD, 0x00]));
        root
    }

    #[test]
    fn encode_then_decode() {
        let codec = SceneCodec::builtin();
        let dir = sample();
        let bytes = codec.encode(&dir).unwrap();
        assert_eq!(codec.decode(bytes.clone()).unwrap(), dir);
        assert_eq!(codec.encode(&codec.decode(bytes.clone()).unwrap()).unwrap(), bytes);
    }

    #[test]
    fn trailing_bytes_are_tolerated() {
        let codec = SceneCodec::builtin();
        let mut bytes = codec.encode(&sample()).unwrap();
        bytes.extend_from_slice(&[1, 2, 3]);
        assert_eq!(codec.decode(bytes).unwrap(), sample());
    }

    #[test]
    fn decode_stream_leaves_cursor_after_directory() {
        let codec = SceneCodec::builtin();
        let first = codec.encode(&sample()).unwrap();
        let mut both = first.clone();
        both.extend_from_slice(&first);
        let mut stream = BinaryStream::from_bytes(both);
        codec.decode_stream(&mut stream).unwrap();
        assert_eq!(stream.position(), first.len() as u64);
        codec.decode_stream(&mut stream).unwrap();
        assert!(stream.is_at_end());
    }

    #[test]
    fn big_endian_file_round_trips() {
        let codec = SceneCodec::builtin();
        let dir = sample().with_endian(Endian::Big);
        let bytes = codec.encode(&dir).unwrap();
        let back = codec.decode(bytes.clone()).unwrap();
        assert_eq!(back.endian, Endian::Big);
        assert_eq!(codec.encode(&back).unwrap(), bytes);
    }

    #[test]
    fn initial_endian_from_config() {
        let mut config = SceneConfig::default();
        config.initial_endian = Endian::Big;
        let codec = SceneCodec::new(Registry::builtin(), config);
        let dir = sample().with_endian(Endian::Big);
        let bytes = codec.encode(&dir).unwrap();
        assert_eq!(codec.decode(bytes).unwrap().endian, Endian::Big);
    }

    #[test]
    fn host_native_split_is_self_consistent() {
        let mut config = SceneConfig::default();
        config.revision_split = RevisionSplit::HostNative;
        let codec = SceneCodec::new(Registry::builtin(), config);
        let dir = sample();
        let bytes = codec.encode(&dir).unwrap();
        assert_eq!(codec.decode(bytes).unwrap(), dir);
    }

    #[test]
    fn symbol_ceiling_from_config() {
        let mut root = Directory::new(
            25,
            "x".repeat(40),
            OBJECT_DIR.blank(VersionTag::primary(0), 25).unwrap(),
        );
        root.push(Entry::raw("FutureType", "t", vec![]));
        let bytes = SceneCodec::builtin().encode(&root).unwrap();

        let mut config = SceneConfig::default();
        config.limits.max_symbol_len = 16;
        let err = SceneCodec::new(Registry::builtin(), config).decode(bytes).unwrap_err();
        assert!(err.is_sanity_violation());
    }

    #[test]
    fn oversized_label_fails_encode() {
        let root = Directory::new(
            25,
            "x".repeat(9000),
            OBJECT_DIR.blank(VersionTag::primary(0), 25).unwrap(),
        );
        let err = SceneCodec::builtin().encode(&root).unwrap_err();
        assert!(err.is_sanity_violation());
        assert!(matches!(
            err,
            SceneError::Stream(StreamError::CountSanityViolation {
                what: "symbol length",
                count: 9000,
                max: 8192,
            })
        ));
    }

    #[test]
    fn unencodable_symbol_fails_write() {
        let root = Directory::new(
            25,
            "\u{263A}",
            OBJECT_DIR.blank(VersionTag::primary(0), 25).unwrap(),
        );
        let err = SceneCodec::builtin().encode(&root).unwrap_err();
        assert!(matches!(err, SceneError::Stream(_)));
    }

    #[test]
    fn file_round_trip() {
        let codec = SceneCodec::builtin();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("venue.milo");
        codec.write_file(&path, &sample()).unwrap();
        assert_eq!(codec.read_file(&path).unwrap(), sample());
    }

    #[test]
    fn truncated_file_fails() {
        let codec = SceneCodec::builtin();
        let bytes = codec.encode(&sample()).unwrap();
        let cut = &bytes[..bytes.len() - TERMINATOR.len()];
        let err = codec.decode(cut.to_vec()).unwrap_err();
        assert!(err.is_desync());
    }

    #[test]
    fn codec_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SceneCodec>();
    }
}
