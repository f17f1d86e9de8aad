//! BAM readers and writers with consistent error context.
//!
//! Reading can decompress BGZF blocks on several threads (`threads > 1`); writing uses the
//! multi-threaded BGZF writer under the same condition.

use std::fs::File;
use std::io::{self, BufRead, Read, Write};
use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::{Context, Result};
use noodles::bgzf::io::{
    MultithreadedReader, MultithreadedWriter, Reader as BgzfReader, Writer as BgzfWriter,
};
use noodles::sam::Header;
use noodles::sam::alignment::record_buf::RecordBuf;

/// Single- or multi-threaded BGZF reader.
pub enum BgzfReaderEnum {
    /// One thread.
    SingleThreaded(BgzfReader<File>),
    /// Block decompression on worker threads.
    MultiThreaded(MultithreadedReader<File>),
}

impl Read for BgzfReaderEnum {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::SingleThreaded(r) => r.read(buf),
            Self::MultiThreaded(r) => r.read(buf),
        }
    }
}

impl BufRead for BgzfReaderEnum {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            Self::SingleThreaded(r) => r.fill_buf(),
            Self::MultiThreaded(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            Self::SingleThreaded(r) => r.consume(amt),
            Self::MultiThreaded(r) => r.consume(amt),
        }
    }
}

/// BAM reader over either BGZF reader.
pub type BamReader = noodles::bam::io::Reader<BgzfReaderEnum>;

/// Single- or multi-threaded BGZF writer.
pub enum BgzfWriterEnum {
    /// One thread.
    SingleThreaded(BgzfWriter<File>),
    /// Block compression on worker threads.
    MultiThreaded(MultithreadedWriter<File>),
}

impl Write for BgzfWriterEnum {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::SingleThreaded(w) => w.write(buf),
            Self::MultiThreaded(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::SingleThreaded(w) => w.flush(),
            Self::MultiThreaded(w) => w.flush(),
        }
    }
}

impl BgzfWriterEnum {
    /// Flushes remaining blocks and writes the BGZF EOF marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the final blocks cannot be written.
    pub fn finish(self) -> io::Result<()> {
        match self {
            Self::SingleThreaded(w) => w.finish().map(|_| ()),
            Self::MultiThreaded(mut w) => w.finish().map(|_| ()),
        }
    }
}

/// BAM writer over either BGZF writer.
pub type BamWriter = noodles::bam::io::Writer<BgzfWriterEnum>;

/// Opens a BAM file and reads its header.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or its header cannot be parsed.
pub fn create_bam_reader<P: AsRef<Path>>(path: P, threads: usize) -> Result<(BamReader, Header)> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open input BAM: {}", path.display()))?;

    let bgzf = match NonZeroUsize::new(threads).filter(|n| n.get() > 1) {
        Some(workers) => {
            BgzfReaderEnum::MultiThreaded(MultithreadedReader::with_worker_count(workers, file))
        }
        None => BgzfReaderEnum::SingleThreaded(BgzfReader::new(file)),
    };

    let mut reader = noodles::bam::io::Reader::from(bgzf);
    let header = reader
        .read_header()
        .with_context(|| format!("Failed to read header from: {}", path.display()))?;
    Ok((reader, header))
}

/// Iterates the records of a BAM reader as `anyhow` results, naming the file on failure.
pub fn record_bufs<'a>(
    reader: &'a mut BamReader,
    header: &'a Header,
    path: &'a Path,
) -> impl Iterator<Item = Result<RecordBuf>> + 'a {
    reader.record_bufs(header).map(move |result| {
        result.with_context(|| format!("Failed to read record from: {}", path.display()))
    })
}

/// Creates a BAM file and writes its header.
///
/// # Errors
///
/// Returns an error if the file cannot be created or the header cannot be written.
pub fn create_bam_writer<P: AsRef<Path>>(
    path: P,
    header: &Header,
    threads: usize,
) -> Result<BamWriter> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create output BAM: {}", path.display()))?;

    let bgzf = match NonZeroUsize::new(threads).filter(|n| n.get() > 1) {
        Some(workers) => {
            BgzfWriterEnum::MultiThreaded(MultithreadedWriter::with_worker_count(workers, file))
        }
        None => BgzfWriterEnum::SingleThreaded(BgzfWriter::new(file)),
    };

    let mut writer = noodles::bam::io::Writer::from(bgzf);
    writer
        .write_header(header)
        .with_context(|| format!("Failed to write header to: {}", path.display()))?;
    Ok(writer)
}

/// Finishes a BAM writer so the file ends with a complete EOF block.
///
/// # Errors
///
/// Returns an error if the final blocks cannot be written.
pub fn finish_bam_writer(writer: BamWriter, path: &Path) -> Result<()> {
    writer
        .into_inner()
        .finish()
        .with_context(|| format!("Failed to finish output BAM: {}", path.display()))
}
