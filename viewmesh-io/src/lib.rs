//! I/O operations for viewmesh frame streams
//!
//! This crate serializes composited per-frame meshes to the append-only
//! binary stream consumed by the free-viewpoint player, and reads such
//! streams back record by record.

pub mod stream;

pub use stream::{read_frames, FrameStreamReader, FrameStreamWriter};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use viewmesh_core::{FrameMesh, Point3f};

    fn sample_mesh(offset: f32) -> FrameMesh {
        FrameMesh::from_parts(
            vec![
                Point3f::new(offset, 0.0, -1.0),
                Point3f::new(offset + 1.0, 0.0, -1.5),
                Point3f::new(offset, 1.0, -2.0),
                Point3f::new(offset + 1.0, 1.0, -2.5),
            ],
            vec![[0, 2, 1], [1, 2, 3]],
        )
    }

    #[test]
    fn test_single_record_round_trip() {
        let mesh = sample_mesh(0.0);
        let mut writer = FrameStreamWriter::new(Vec::new());
        writer.write_frame(&mesh).unwrap();
        let bytes = writer.into_inner();

        // 2 counts + 4 vertices * 12 bytes + 2 triangles * 12 bytes
        assert_eq!(bytes.len(), 8 + 48 + 24);

        let mut reader = FrameStreamReader::new(Cursor::new(bytes));
        let loaded = reader.read_frame().unwrap().unwrap();
        assert_eq!(loaded, mesh);
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_record_layout_is_little_endian() {
        let mesh = FrameMesh::from_parts(vec![Point3f::new(1.0, 2.0, 3.0)], vec![]);
        let mut writer = FrameStreamWriter::new(Vec::new());
        writer.write_frame(&mesh).unwrap();
        let bytes = writer.into_inner();

        assert_eq!(&bytes[0..4], &1i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &0i32.to_le_bytes());
        assert_eq!(&bytes[8..12], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[12..16], &2.0f32.to_le_bytes());
        assert_eq!(&bytes[16..20], &3.0f32.to_le_bytes());
    }

    #[test]
    fn test_multi_record_boundaries_from_counts_alone() {
        let frames = vec![sample_mesh(0.0), FrameMesh::new(), sample_mesh(10.0)];
        let mut writer = FrameStreamWriter::new(Vec::new());
        for mesh in &frames {
            writer.write_frame(mesh).unwrap();
        }

        let mut reader = FrameStreamReader::new(Cursor::new(writer.into_inner()));
        for expected in &frames {
            let loaded = reader.read_frame().unwrap().unwrap();
            assert_eq!(&loaded, expected);
        }
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_truncated_record_is_an_error() {
        let mut writer = FrameStreamWriter::new(Vec::new());
        writer.write_frame(&sample_mesh(0.0)).unwrap();
        let mut bytes = writer.into_inner();
        bytes.truncate(bytes.len() - 5);

        let mut reader = FrameStreamReader::new(Cursor::new(bytes));
        assert!(reader.read_frame().is_err());
    }

    #[test]
    fn test_truncated_header_is_an_error() {
        let mut reader = FrameStreamReader::new(Cursor::new(vec![1u8, 0]));
        assert!(reader.read_frame().is_err());
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let mesh = FrameMesh::from_parts(vec![Point3f::new(0.0, 0.0, 0.0)], vec![[0, 0, 3]]);
        let mut writer = FrameStreamWriter::new(Vec::new());
        writer.write_frame(&mesh).unwrap();

        let mut reader = FrameStreamReader::new(Cursor::new(writer.into_inner()));
        assert!(reader.read_frame().is_err());
    }

    #[test]
    fn test_file_create_appends_across_frames() {
        let path = "test_frame_stream.bin";
        {
            let mut writer = FrameStreamWriter::create(path).unwrap();
            writer.write_frame(&sample_mesh(0.0)).unwrap();
            writer.write_frame(&sample_mesh(5.0)).unwrap();
            writer.flush().unwrap();
        }

        let frames = read_frames(path).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], sample_mesh(0.0));
        assert_eq!(frames[1], sample_mesh(5.0));

        // A second create truncates back to an empty stream.
        {
            let mut writer = FrameStreamWriter::create(path).unwrap();
            writer.write_frame(&FrameMesh::new()).unwrap();
            writer.flush().unwrap();
        }
        let frames = read_frames(path).unwrap();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_empty());

        let _ = fs::remove_file(path);
    }
}
