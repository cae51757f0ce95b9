use std::fs::File;
use std::path::Path;

use arrow::csv::Writer;
use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchWriter};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::error::{OutputError, Result};

/// A table that is collected in memory and flushed to disk as record batches.
pub trait ResultWriter: Sized {
    fn schema() -> Schema;
    fn write_to_file(&mut self) -> Result<()>;
    fn close_file(self) -> Result<()>;
}

/// Output file, Parquet or CSV depending on the extension. An existing file is replaced.
#[derive(Debug)]
pub enum WriterType {
    Parquet(WriterParquet),
    Csv(WriterCsv),
}

impl WriterType {
    pub fn new(file_name: &Path, schema: Schema) -> Result<Self> {
        if file_name.exists() {
            std::fs::remove_file(file_name).map_err(|e| OutputError::io(file_name, e))?;
        }
        if let Some(parent) = file_name.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| OutputError::io(parent, e))?;
            }
        }
        match file_name.extension().and_then(|ext| ext.to_str()) {
            Some("parquet") => Ok(WriterType::Parquet(WriterParquet::new(file_name, schema)?)),
            Some("csv") => Ok(WriterType::Csv(WriterCsv::new(file_name)?)),
            _ => Err(OutputError::UnsupportedExtension(file_name.to_path_buf())),
        }
    }

    pub fn record_batch_to_file(&mut self, record_batch: &RecordBatch) -> Result<()> {
        match self {
            WriterType::Parquet(parquet) => parquet.writer.write(record_batch)?,
            WriterType::Csv(csv) => csv.writer.write(record_batch)?,
        }
        Ok(())
    }

    pub fn close(self) -> Result<()> {
        match self {
            WriterType::Parquet(parquet) => parquet.close(),
            WriterType::Csv(csv) => csv.close(),
        }
    }
}

#[derive(Debug)]
pub struct WriterParquet {
    pub writer: ArrowWriter<File>,
}

impl WriterParquet {
    fn new(file_name: &Path, schema: Schema) -> Result<Self> {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let output_file = File::create(file_name).map_err(|e| OutputError::io(file_name, e))?;
        let writer = ArrowWriter::try_new(output_file, SchemaRef::from(schema), Some(props))?;
        Ok(Self { writer })
    }

    pub fn close(self) -> Result<()> {
        self.writer.close()?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct WriterCsv {
    pub writer: Writer<File>,
}

impl WriterCsv {
    fn new(file_name: &Path) -> Result<Self> {
        let file = File::create(file_name).map_err(|e| OutputError::io(file_name, e))?;
        Ok(Self {
            writer: Writer::new(file),
        })
    }

    pub fn close(self) -> Result<()> {
        self.writer.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_follows_extension() {
        let dir = tempfile::tempdir().unwrap();
        let schema = Schema::empty();
        assert!(matches!(
            WriterType::new(&dir.path().join("a.parquet"), schema.clone()),
            Ok(WriterType::Parquet(_))
        ));
        assert!(matches!(
            WriterType::new(&dir.path().join("nested").join("a.csv"), schema.clone()),
            Ok(WriterType::Csv(_))
        ));
        assert!(matches!(
            WriterType::new(&dir.path().join("a.json"), schema),
            Err(OutputError::UnsupportedExtension(_))
        ));
    }
}
