//! # Chunk Container
//!
//! ```text
//! header      8 ASCII bytes   e.g. "GORSPR20"
//! count       u32
//! chunk * count:
//!   id        8 ASCII bytes   e.g. "SPRTDATA"
//!   length    u32
//!   payload   length bytes
//! ```
//!
//! The reader validates the header, then walks the chunk records once to
//! build a directory of payload ranges. Chunks are opened by id through a
//! [`BinaryReader`] bounded to that payload; when an id repeats, the first
//! record wins.

use std::io::Write;
use std::ops::Range;

use super::binary::{BinaryReader, BinaryWriter};
use super::{PersistError, PersistResult};

/// Length of file headers and chunk ids
pub const ID_LEN: usize = 8;

fn encode_id(id: &str) -> PersistResult<[u8; ID_LEN]> {
    let bytes = id.as_bytes();
    if bytes.len() != ID_LEN || !id.is_ascii() {
        return Err(PersistError::InvalidArgument(format!(
            "chunk identifiers are {ID_LEN} ASCII characters, got {id:?}"
        )));
    }
    let mut encoded = [0; ID_LEN];
    encoded.copy_from_slice(bytes);
    Ok(encoded)
}

fn decode_id(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Read the file header of `data` without validating it
pub fn peek_header(data: &[u8]) -> Option<String> {
    data.get(..ID_LEN).map(decode_id)
}

/// Builds a container in memory and writes it out in one step
#[derive(Debug)]
pub struct ChunkFileWriter {
    header: [u8; ID_LEN],
    chunks: Vec<([u8; ID_LEN], Vec<u8>)>,
}

impl ChunkFileWriter {
    /// Start a container with an 8-character header
    pub fn new(header: &str) -> PersistResult<Self> {
        Ok(Self {
            header: encode_id(header)?,
            chunks: Vec::new(),
        })
    }

    /// Append a chunk whose payload is produced by `write`
    pub fn chunk(&mut self, id: &str, write: impl FnOnce(&mut BinaryWriter)) -> PersistResult<()> {
        let id = encode_id(id)?;
        let mut payload = BinaryWriter::new();
        write(&mut payload);
        self.chunks.push((id, payload.into_bytes()));
        Ok(())
    }

    /// Number of chunks appended so far
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Encode the container
    pub fn to_bytes(&self) -> PersistResult<Vec<u8>> {
        let mut out = BinaryWriter::new();
        out.write_bytes(&self.header);
        out.write_u32(Self::length_field(self.chunks.len())?);
        for (id, payload) in &self.chunks {
            out.write_bytes(id);
            out.write_u32(Self::length_field(payload.len())?);
            out.write_bytes(payload);
        }
        Ok(out.into_bytes())
    }

    /// Encode the container into `writer`
    pub fn write_to(&self, writer: &mut impl Write) -> PersistResult<()> {
        writer.write_all(&self.to_bytes()?)?;
        writer.flush()?;
        Ok(())
    }

    fn length_field(length: usize) -> PersistResult<u32> {
        u32::try_from(length).map_err(|_| PersistError::InvalidValue {
            field: "chunk length",
            value: length as i64,
        })
    }
}

#[derive(Debug, Clone)]
struct ChunkEntry {
    id: String,
    range: Range<usize>,
}

/// Indexed view over an encoded container
#[derive(Debug, Clone)]
pub struct ChunkFileReader<'a> {
    data: &'a [u8],
    header: String,
    directory: Vec<ChunkEntry>,
}

impl<'a> ChunkFileReader<'a> {
    /// Validate the header against `expected` and index every chunk
    pub fn open(data: &'a [u8], expected: &str) -> PersistResult<Self> {
        let mut cursor = BinaryReader::new(data);
        let header = match cursor.read_bytes(ID_LEN) {
            Ok(bytes) => decode_id(bytes),
            Err(_) => {
                return Err(PersistError::InvalidHeader {
                    expected: expected.to_string(),
                    found: decode_id(data),
                })
            }
        };
        if header != expected {
            return Err(PersistError::InvalidHeader {
                expected: expected.to_string(),
                found: header,
            });
        }

        let count = cursor.read_u32()?;
        let mut directory = Vec::new();
        for _ in 0..count {
            let id = decode_id(cursor.read_bytes(ID_LEN)?);
            let length = cursor.read_u32()? as usize;
            let start = cursor.position();
            cursor.skip(length)?;
            directory.push(ChunkEntry {
                id,
                range: start..start + length,
            });
        }

        Ok(Self { data, header, directory })
    }

    /// File header
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Whether a chunk with `id` is present
    pub fn contains(&self, id: &str) -> bool {
        self.directory.iter().any(|entry| entry.id == id)
    }

    /// Ids in file order
    pub fn chunk_ids(&self) -> impl Iterator<Item = &str> {
        self.directory.iter().map(|entry| entry.id.as_str())
    }

    /// Payload length of a chunk
    pub fn chunk_len(&self, id: &str) -> Option<usize> {
        self.find(id).map(|entry| entry.range.len())
    }

    /// Open a chunk for reading
    pub fn open_chunk(&self, id: &str) -> PersistResult<BinaryReader<'a>> {
        let data: &'a [u8] = self.data;
        self.find(id)
            .map(|entry| BinaryReader::new(&data[entry.range.clone()]))
            .ok_or_else(|| PersistError::MissingChunk(id.to_string()))
    }

    /// Open a chunk if it is present
    pub fn open_optional(&self, id: &str) -> Option<BinaryReader<'a>> {
        let reader = self.open_chunk(id).ok();
        if reader.is_none() {
            log::debug!("Optional chunk {id} not present in {}", self.header);
        }
        reader
    }

    fn find(&self, id: &str) -> Option<&ChunkEntry> {
        self.directory.iter().find(|entry| entry.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        let mut file = ChunkFileWriter::new("TESTFILE").unwrap();
        file.chunk("FIRSTCHK", |w| w.write_i32(7)).unwrap();
        file.chunk("SECNDCHK", |w| w.write_string("hi")).unwrap();
        file.to_bytes().unwrap()
    }

    #[test]
    fn test_layout() {
        let bytes = sample();
        assert_eq!(&bytes[..8], b"TESTFILE");
        assert_eq!(&bytes[8..12], &2u32.to_le_bytes());
        assert_eq!(&bytes[12..20], b"FIRSTCHK");
        assert_eq!(&bytes[20..24], &4u32.to_le_bytes());
        assert_eq!(bytes.len(), 12 + (12 + 4) + (12 + 3));
    }

    #[test]
    fn test_directory_and_optional_chunks() {
        let bytes = sample();
        let file = ChunkFileReader::open(&bytes, "TESTFILE").unwrap();
        assert_eq!(file.chunk_ids().collect::<Vec<_>>(), vec!["FIRSTCHK", "SECNDCHK"]);
        assert_eq!(file.open_chunk("SECNDCHK").unwrap().read_string().unwrap(), "hi");
        assert_eq!(file.open_chunk("FIRSTCHK").unwrap().read_i32().unwrap(), 7);
        assert!(file.open_optional("TXTRDATA").is_none());
        assert!(matches!(file.open_chunk("TXTRDATA"), Err(PersistError::MissingChunk(_))));
    }

    #[test]
    fn test_reads_are_bounded_to_the_chunk() {
        let bytes = sample();
        let file = ChunkFileReader::open(&bytes, "TESTFILE").unwrap();
        let mut chunk = file.open_chunk("FIRSTCHK").unwrap();
        chunk.read_i32().unwrap();
        assert!(matches!(chunk.read_u8(), Err(PersistError::ChunkOverrun { .. })));
    }

    #[test]
    fn test_bad_header_and_truncation() {
        let bytes = sample();
        assert!(matches!(
            ChunkFileReader::open(&bytes, "GORSPR20"),
            Err(PersistError::InvalidHeader { .. })
        ));
        assert!(matches!(ChunkFileReader::open(b"TEST", "TESTFILE"), Err(PersistError::InvalidHeader { .. })));
        assert!(matches!(
            ChunkFileReader::open(&bytes[..bytes.len() - 1], "TESTFILE"),
            Err(PersistError::ChunkOverrun { .. })
        ));
    }

    #[test]
    fn test_ids_must_be_eight_ascii_characters() {
        assert!(ChunkFileWriter::new("SHORT").is_err());
        let mut file = ChunkFileWriter::new("TESTFILE").unwrap();
        assert!(file.chunk("TOOLONGID", |_| {}).is_err());
        assert_eq!(file.chunk_count(), 0);
    }
}
