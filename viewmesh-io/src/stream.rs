//! Append-only binary frame mesh stream
//!
//! One record per frame, back to back, little endian, no header or
//! checksum:
//!
//! ```text
//! i32 vertex_count
//! i32 triangle_count
//! f32[3 * vertex_count]   world-space positions
//! u32[3 * triangle_count] vertex index triples
//! ```
//!
//! A reader derives each record's byte span from the two leading counts and
//! advances sequentially; a truncated or corrupt record makes the remainder
//! of the stream unreadable.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use viewmesh_core::{Error, FrameMesh, Point3f, Result};

/// Writer appending one [`FrameMesh`] record per frame to a byte stream.
pub struct FrameStreamWriter<W: Write> {
    inner: W,
}

impl FrameStreamWriter<BufWriter<File>> {
    /// Create (or truncate) the stream file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> FrameStreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Append one frame record.
    ///
    /// The full record is composed in memory and handed to the sink as a
    /// single write, so an I/O failure surfaces before any bytes of the
    /// record land in the stream. No durability guarantee beyond that.
    pub fn write_frame(&mut self, mesh: &FrameMesh) -> Result<()> {
        let vertex_count = i32::try_from(mesh.vertex_count())
            .map_err(|_| Error::InvalidData("frame vertex count exceeds i32".to_string()))?;
        let triangle_count = i32::try_from(mesh.triangle_count())
            .map_err(|_| Error::InvalidData("frame triangle count exceeds i32".to_string()))?;

        let mut record =
            Vec::with_capacity(8 + mesh.vertex_count() * 12 + mesh.triangle_count() * 12);
        record.write_i32::<LittleEndian>(vertex_count)?;
        record.write_i32::<LittleEndian>(triangle_count)?;
        for vertex in &mesh.vertices {
            record.write_f32::<LittleEndian>(vertex.x)?;
            record.write_f32::<LittleEndian>(vertex.y)?;
            record.write_f32::<LittleEndian>(vertex.z)?;
        }
        for triangle in &mesh.triangles {
            for &index in triangle {
                record.write_u32::<LittleEndian>(index)?;
            }
        }

        self.inner.write_all(&record)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Reader consuming [`FrameMesh`] records sequentially until end of file.
pub struct FrameStreamReader<R: Read> {
    inner: R,
}

impl FrameStreamReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> FrameStreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Read the next frame record, or `None` at a clean end of file.
    ///
    /// End of file in the middle of a record is an error, as is a record
    /// whose counts are negative or whose indices point past its own
    /// vertex buffer.
    pub fn read_frame(&mut self) -> Result<Option<FrameMesh>> {
        let vertex_count = match self.read_leading_count()? {
            Some(count) => count,
            None => return Ok(None),
        };
        let triangle_count = self.inner.read_i32::<LittleEndian>().map_err(truncated)?;
        if vertex_count < 0 || triangle_count < 0 {
            return Err(Error::InvalidData(format!(
                "negative record counts ({} vertices, {} triangles)",
                vertex_count, triangle_count
            )));
        }

        let mut vertices = Vec::with_capacity(vertex_count as usize);
        for _ in 0..vertex_count {
            let x = self.inner.read_f32::<LittleEndian>().map_err(truncated)?;
            let y = self.inner.read_f32::<LittleEndian>().map_err(truncated)?;
            let z = self.inner.read_f32::<LittleEndian>().map_err(truncated)?;
            vertices.push(Point3f::new(x, y, z));
        }

        let mut triangles = Vec::with_capacity(triangle_count as usize);
        for _ in 0..triangle_count {
            let mut triangle = [0u32; 3];
            for index in &mut triangle {
                *index = self.inner.read_u32::<LittleEndian>().map_err(truncated)?;
            }
            triangles.push(triangle);
        }

        let mesh = FrameMesh::from_parts(vertices, triangles);
        if !mesh.indices_in_bounds() {
            return Err(Error::InvalidData(
                "record triangle index exceeds its vertex count".to_string(),
            ));
        }
        Ok(Some(mesh))
    }

    /// Read the leading vertex count, distinguishing clean EOF (no bytes)
    /// from truncation (some bytes).
    fn read_leading_count(&mut self) -> Result<Option<i32>> {
        let mut buf = [0u8; 4];
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.inner.read(&mut buf[filled..])?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(Error::InvalidData(
                    "stream ends inside a record header".to_string(),
                ));
            }
            filled += n;
        }
        Ok(Some(i32::from_le_bytes(buf)))
    }
}

fn truncated(err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::InvalidData("stream ends inside a record".to_string())
    } else {
        Error::Io(err)
    }
}

/// Read every record of a frame mesh stream file.
pub fn read_frames<P: AsRef<Path>>(path: P) -> Result<Vec<FrameMesh>> {
    let mut reader = FrameStreamReader::open(path)?;
    let mut frames = Vec::new();
    while let Some(mesh) = reader.read_frame()? {
        frames.push(mesh);
    }
    Ok(frames)
}
