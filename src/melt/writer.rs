use crate::error::Result;
use crate::melt::types::{Frame, Plain};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes frames to JSON Lines files, one file per frame name
pub struct FrameWriter {
    output_dir: PathBuf,
    writers: HashMap<String, RowWriter<BufWriter<File>>>,
}

impl FrameWriter {
    /// Create a writer that puts `<name>.jsonl` files into `output_dir`
    pub fn new_file_writer<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
        std::fs::create_dir_all(&output_dir)?;

        Ok(FrameWriter {
            output_dir: output_dir.as_ref().to_path_buf(),
            writers: HashMap::new(),
        })
    }

    /// Append the rows of `frame` to the file for `name`
    pub fn write_frame(&mut self, name: &str, frame: &Frame) -> Result<()> {
        if !self.writers.contains_key(name) {
            let path = self.output_dir.join(format!("{}.jsonl", name));
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            log::debug!("writing frame '{}' to {}", name, path.display());
            self.writers
                .insert(name.to_string(), RowWriter::new(BufWriter::new(file)));
        }

        match self.writers.get_mut(name) {
            Some(writer) => writer.write_frame(frame),
            None => Ok(()),
        }
    }

    /// Flush all writers
    pub fn flush(&mut self) -> Result<()> {
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Writes rows and documents as JSON Lines to a single output
pub struct RowWriter<W: Write> {
    writer: W,
}

impl<W: Write> RowWriter<W> {
    pub fn new(writer: W) -> Self {
        RowWriter { writer }
    }

    /// One JSON object per row; fails on a ragged frame
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        for row in frame.rows()? {
            let json = serde_json::to_string(&row)?;
            writeln!(self.writer, "{}", json)?;
        }
        Ok(())
    }

    /// One JSON document on a single line
    pub fn write_plain(&mut self, plain: &Plain) -> Result<()> {
        let json = serde_json::to_string(plain)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::Scalar;

    fn frame() -> Frame {
        let mut frame = Frame::new();
        frame.insert_column("DEPT", vec![Some(Scalar::Double(100.0)), Some(Scalar::Double(100.5))]);
        frame.insert_column("GR", vec![Some(Scalar::Double(50.0)), None]);
        frame
    }

    #[test]
    fn test_row_writer() {
        let mut writer = RowWriter::new(Vec::new());
        writer.write_frame(&frame()).unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines, vec![r#"{"DEPT":100.0,"GR":50.0}"#, r#"{"DEPT":100.5,"GR":null}"#]);
    }

    #[test]
    fn test_row_writer_rejects_ragged() {
        let mut ragged = frame();
        ragged.push("GR", Some(Scalar::Double(1.0)));

        let mut writer = RowWriter::new(Vec::new());
        assert!(matches!(writer.write_frame(&ragged), Err(Error::RaggedFrame)));
    }

    #[test]
    fn test_file_writer() {
        let dir = std::env::temp_dir().join(format!("witsml-melt-frames-{}", std::process::id()));
        let mut writer = FrameWriter::new_file_writer(&dir).unwrap();
        writer.write_frame("log", &frame()).unwrap();
        writer.flush().unwrap();

        let content = std::fs::read_to_string(dir.join("log.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 2);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
