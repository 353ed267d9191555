//! Binary level container reader.
//!
//! A level file is a lump-indexed archive: a 12-byte header, a run of lump
//! data, and a directory of 16-byte entries describing each lump. All fields
//! are little-endian. The whole file is pulled into memory up front; every
//! read is offset-based, so repeated lookups never disturb each other.

use std::io::Cursor;
use std::path::Path;

use byteorder::{LE, ReadBytesExt};
use tracing::debug;

use crate::error::LevelError;

pub const HEADER_SIZE: usize = 12;
pub const DIR_ENTRY_SIZE: usize = 16;
pub const VERTEX_SIZE: usize = 4;
pub const LINEDEF_SIZE: usize = 14;

/// Offsets of the per-map lumps relative to the map marker lump.
const LINEDEFS_OFFSET: usize = 2;
const VERTEXES_OFFSET: usize = 4;

/// 2D map point in map units. Loaded once, then owned by the map model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vertex {
    pub x: i16,
    pub y: i16,
}

/// One wall segment, as a pair of vertex indices. A linedef record is 14
/// bytes on disk; only the leading vertex indices matter here, the side and
/// flag fields are opaque to this reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Linedef {
    pub start: u16,
    pub end: u16,
}

#[derive(Debug, Clone)]
pub struct WadHeader {
    pub magic: String,
    pub lump_count: u32,
    pub directory_offset: u32,
}

#[derive(Debug, Clone)]
pub struct LumpEntry {
    pub offset: u32,
    pub size: u32,
    pub name: String,
}

/// Vertices and linedefs for one named map, straight out of the container.
#[derive(Debug, Clone)]
pub struct LevelGeometry {
    pub vertices: Vec<Vertex>,
    pub linedefs: Vec<Linedef>,
}

#[derive(Debug)]
pub struct WadFile {
    data: Vec<u8>,
    header: WadHeader,
    directory: Vec<LumpEntry>,
}

impl WadFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let data = std::fs::read(path)?;
        Self::parse(data)
    }

    pub fn parse(data: Vec<u8>) -> Result<Self, LevelError> {
        let header = read_header(&data)?;
        let directory = read_directory(&data, &header)?;
        debug!(
            magic = header.magic,
            lumps = header.lump_count,
            "parsed level container"
        );
        Ok(Self {
            data,
            header,
            directory,
        })
    }

    pub fn header(&self) -> &WadHeader {
        &self.header
    }

    pub fn directory(&self) -> &[LumpEntry] {
        &self.directory
    }

    /// First directory entry with the given name, case-insensitive. Absence
    /// is not an error at this layer; callers decide whether it is fatal.
    pub fn find_lump(&self, name: &str) -> Option<(usize, &LumpEntry)> {
        self.directory
            .iter()
            .enumerate()
            .find(|(_, lump)| lump.name.eq_ignore_ascii_case(name))
    }

    /// Decodes a lump as `size / record_width` fixed-width records. A size
    /// that is not an exact multiple of the record width is malformed.
    pub fn read_records<T>(
        &self,
        lump: &LumpEntry,
        record_width: usize,
        decode: impl Fn(&[u8]) -> T,
    ) -> Result<Vec<T>, LevelError> {
        if lump.size as usize % record_width != 0 {
            return Err(LevelError::format(format!(
                "lump {} has size {} which is not a multiple of record width {}",
                lump.name, lump.size, record_width
            )));
        }
        let count = lump.size as usize / record_width;
        let base = lump.offset as usize;
        let mut records = Vec::with_capacity(count);
        for i in 0..count {
            let at = base + i * record_width;
            records.push(decode(&self.data[at..at + record_width]));
        }
        Ok(records)
    }

    /// Extracts vertex and linedef collections for the named map. The map
    /// marker lump is located by name; VERTEXES and LINEDEFS sit at fixed
    /// offsets behind it.
    pub fn load_level(&self, map_name: &str) -> Result<LevelGeometry, LevelError> {
        let (marker, _) = self
            .find_lump(map_name)
            .ok_or_else(|| LevelError::not_found(format!("map {map_name}")))?;

        let vertex_lump = self.map_lump(marker, VERTEXES_OFFSET, "VERTEXES")?;
        let linedef_lump = self.map_lump(marker, LINEDEFS_OFFSET, "LINEDEFS")?;

        let vertices = self.read_records(&vertex_lump, VERTEX_SIZE, decode_vertex)?;
        let linedefs = self.read_records(&linedef_lump, LINEDEF_SIZE, decode_linedef)?;

        for (i, ld) in linedefs.iter().enumerate() {
            if ld.start as usize >= vertices.len() || ld.end as usize >= vertices.len() {
                return Err(LevelError::format(format!(
                    "linedef {} of map {} references vertex out of range (have {})",
                    i,
                    map_name,
                    vertices.len()
                )));
            }
        }

        debug!(
            map = map_name,
            vertices = vertices.len(),
            linedefs = linedefs.len(),
            "loaded level geometry"
        );
        Ok(LevelGeometry { vertices, linedefs })
    }

    fn map_lump(
        &self,
        marker: usize,
        offset: usize,
        expected: &str,
    ) -> Result<LumpEntry, LevelError> {
        let lump = self
            .directory
            .get(marker + offset)
            .ok_or_else(|| LevelError::not_found(format!("{expected} lump")))?;
        if !lump.name.eq_ignore_ascii_case(expected) {
            return Err(LevelError::format(format!(
                "expected {} lump after map marker, found {}",
                expected, lump.name
            )));
        }
        Ok(lump.clone())
    }
}

fn read_header(data: &[u8]) -> Result<WadHeader, LevelError> {
    if data.len() < HEADER_SIZE {
        return Err(LevelError::format(format!(
            "file too short for header: {} bytes",
            data.len()
        )));
    }
    let magic = decode_name(&data[0..4]);
    // Recognized tags are format versions, parsed identically.
    if magic != "IWAD" && magic != "PWAD" {
        return Err(LevelError::format(format!("unrecognized magic {magic:?}")));
    }
    let mut cur = Cursor::new(data);
    cur.set_position(4);
    let lump_count = cur.read_u32::<LE>()?;
    let directory_offset = cur.read_u32::<LE>()?;
    Ok(WadHeader {
        magic,
        lump_count,
        directory_offset,
    })
}

fn read_directory(data: &[u8], header: &WadHeader) -> Result<Vec<LumpEntry>, LevelError> {
    let count = header.lump_count as usize;
    let dir_off = header.directory_offset as usize;
    let dir_end = dir_off
        .checked_add(count * DIR_ENTRY_SIZE)
        .ok_or_else(|| LevelError::format("directory extent overflows"))?;
    if dir_end > data.len() {
        return Err(LevelError::format(format!(
            "directory of {} lumps at offset {} exceeds file size {}",
            count,
            dir_off,
            data.len()
        )));
    }

    let mut directory = Vec::with_capacity(count);
    let mut cur = Cursor::new(data);
    for i in 0..count {
        let at = dir_off + i * DIR_ENTRY_SIZE;
        cur.set_position(at as u64);
        let offset = cur.read_u32::<LE>()?;
        let size = cur.read_u32::<LE>()?;
        let name = decode_name(&data[at + 8..at + 16]);
        let lump_end = offset as u64 + size as u64;
        if lump_end > data.len() as u64 {
            return Err(LevelError::format(format!(
                "lump {name} spans {offset}..{lump_end}, past file size {}",
                data.len()
            )));
        }
        directory.push(LumpEntry { offset, size, name });
    }
    Ok(directory)
}

/// ASCII label, right-trimmed of NUL padding and case-normalized. Bytes
/// outside ASCII are dropped rather than transliterated.
fn decode_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    raw[..end]
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| (b as char).to_ascii_uppercase())
        .collect()
}

fn decode_vertex(raw: &[u8]) -> Vertex {
    Vertex {
        x: i16::from_le_bytes([raw[0], raw[1]]),
        y: i16::from_le_bytes([raw[2], raw[3]]),
    }
}

fn decode_linedef(raw: &[u8]) -> Linedef {
    Linedef {
        start: u16::from_le_bytes([raw[0], raw[1]]),
        end: u16::from_le_bytes([raw[2], raw[3]]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assembles a container: header, lump data in order, directory at the end.
    fn build_wad(magic: &[u8; 4], lumps: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(magic);
        data.extend_from_slice(&(lumps.len() as u32).to_le_bytes());
        data.extend_from_slice(&[0; 4]); // directory offset patched below

        let mut entries = Vec::new();
        for (name, bytes) in lumps {
            entries.push((data.len() as u32, bytes.len() as u32, *name));
            data.extend_from_slice(bytes);
        }
        let dir_off = data.len() as u32;
        data[8..12].copy_from_slice(&dir_off.to_le_bytes());
        for (offset, size, name) in entries {
            data.extend_from_slice(&offset.to_le_bytes());
            data.extend_from_slice(&size.to_le_bytes());
            let mut label = [0u8; 8];
            label[..name.len()].copy_from_slice(name.as_bytes());
            data.extend_from_slice(&label);
        }
        data
    }

    fn vertex_bytes(points: &[(i16, i16)]) -> Vec<u8> {
        let mut out = Vec::new();
        for &(x, y) in points {
            out.extend_from_slice(&x.to_le_bytes());
            out.extend_from_slice(&y.to_le_bytes());
        }
        out
    }

    fn linedef_bytes(pairs: &[(u16, u16)]) -> Vec<u8> {
        let mut out = Vec::new();
        for &(start, end) in pairs {
            out.extend_from_slice(&start.to_le_bytes());
            out.extend_from_slice(&end.to_le_bytes());
            out.extend_from_slice(&[0xAB; 10]); // side/flag bytes, opaque
        }
        out
    }

    fn square_wad() -> Vec<u8> {
        let verts = vertex_bytes(&[(0, 0), (256, 0), (256, 256), (0, 256)]);
        let lines = linedef_bytes(&[(0, 1), (1, 2), (2, 3), (3, 0)]);
        build_wad(
            b"IWAD",
            &[
                ("E1M1", Vec::new()),
                ("THINGS", Vec::new()),
                ("LINEDEFS", lines),
                ("SIDEDEFS", Vec::new()),
                ("VERTEXES", verts),
            ],
        )
    }

    #[test]
    fn header_and_directory_round_trip() {
        let wad = WadFile::parse(square_wad()).unwrap();
        assert_eq!(wad.header().magic, "IWAD");
        assert_eq!(wad.header().lump_count, 5);
        assert_eq!(wad.directory().len(), 5);
        let len = wad.data.len() as u64;
        for lump in wad.directory() {
            assert!(lump.offset as u64 + lump.size as u64 <= len);
        }
    }

    #[test]
    fn short_stream_is_format_error() {
        let err = WadFile::parse(vec![b'I', b'W', b'A']).unwrap_err();
        assert!(matches!(err, LevelError::Format(_)));
    }

    #[test]
    fn unknown_magic_is_format_error() {
        let mut data = square_wad();
        data[0..4].copy_from_slice(b"XWAD");
        let err = WadFile::parse(data).unwrap_err();
        assert!(matches!(err, LevelError::Format(_)));
    }

    #[test]
    fn truncated_directory_is_format_error() {
        let mut data = square_wad();
        // Claim more lumps than the directory holds.
        data[4..8].copy_from_slice(&100u32.to_le_bytes());
        let err = WadFile::parse(data).unwrap_err();
        assert!(matches!(err, LevelError::Format(_)));
    }

    #[test]
    fn lump_past_end_is_format_error() {
        let lump = vec![0u8; 8];
        let mut data = build_wad(b"PWAD", &[("BIG", lump)]);
        let dir_off = u32::from_le_bytes(data[8..12].try_into().unwrap()) as usize;
        // Inflate the declared size past the file end.
        data[dir_off + 4..dir_off + 8].copy_from_slice(&9999u32.to_le_bytes());
        let err = WadFile::parse(data).unwrap_err();
        assert!(matches!(err, LevelError::Format(_)));
    }

    #[test]
    fn find_lump_is_case_insensitive() {
        let wad = WadFile::parse(square_wad()).unwrap();
        let (idx, lump) = wad.find_lump("vertexes").unwrap();
        assert_eq!(idx, 4);
        assert_eq!(lump.name, "VERTEXES");
        assert!(wad.find_lump("NOWHERE").is_none());
    }

    #[test]
    fn lump_names_drop_non_ascii_bytes() {
        assert_eq!(decode_name(b"e1m1\0\0\0\0"), "E1M1");
        // Garbage bytes vanish instead of turning into Latin-1 chars.
        assert_eq!(decode_name(&[b'm', 0xC3, b'a', b'p', 0xFF, 0, 0, 0]), "MAP");
        assert_eq!(decode_name(&[0xAA; 8]), "");
    }

    #[test]
    fn vertex_records_round_trip_signed_range() {
        let points = [
            (i16::MIN, i16::MAX),
            (-1, 1),
            (0, 0),
            (12345, -12345),
            (i16::MAX, i16::MIN),
        ];
        let wad_bytes = build_wad(b"IWAD", &[("VERTEXES", vertex_bytes(&points))]);
        let wad = WadFile::parse(wad_bytes).unwrap();
        let (_, lump) = wad.find_lump("VERTEXES").unwrap();
        let decoded = wad.read_records(lump, VERTEX_SIZE, decode_vertex).unwrap();
        assert_eq!(decoded.len(), points.len());
        for (v, &(x, y)) in decoded.iter().zip(points.iter()) {
            assert_eq!((v.x, v.y), (x, y));
        }
    }

    #[test]
    fn ragged_lump_size_is_format_error() {
        let wad_bytes = build_wad(b"IWAD", &[("VERTEXES", vec![0u8; 5])]);
        let wad = WadFile::parse(wad_bytes).unwrap();
        let lump = wad.find_lump("VERTEXES").unwrap().1;
        let err = wad.read_records(lump, VERTEX_SIZE, decode_vertex).unwrap_err();
        assert!(matches!(err, LevelError::Format(_)));
    }

    #[test]
    fn load_level_resolves_map_lumps() {
        let wad = WadFile::parse(square_wad()).unwrap();
        let level = wad.load_level("e1m1").unwrap();
        assert_eq!(level.vertices.len(), 4);
        assert_eq!(level.linedefs.len(), 4);
        assert_eq!(level.vertices[1], Vertex { x: 256, y: 0 });
        assert_eq!(level.linedefs[3], Linedef { start: 3, end: 0 });
    }

    #[test]
    fn missing_map_is_not_found() {
        let wad = WadFile::parse(square_wad()).unwrap();
        let err = wad.load_level("E9M9").unwrap_err();
        assert!(matches!(err, LevelError::NotFound(_)));
    }

    #[test]
    fn linedef_with_bad_vertex_index_is_format_error() {
        let verts = vertex_bytes(&[(0, 0), (64, 0)]);
        let lines = linedef_bytes(&[(0, 7)]);
        let wad_bytes = build_wad(
            b"IWAD",
            &[
                ("E1M1", Vec::new()),
                ("THINGS", Vec::new()),
                ("LINEDEFS", lines),
                ("SIDEDEFS", Vec::new()),
                ("VERTEXES", verts),
            ],
        );
        let wad = WadFile::parse(wad_bytes).unwrap();
        let err = wad.load_level("E1M1").unwrap_err();
        assert!(matches!(err, LevelError::Format(_)));
    }
}
