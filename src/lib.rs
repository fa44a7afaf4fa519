use std::{
    fmt,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::{debug, info};

pub mod error;
pub mod prompt;

pub use error::{Error, Result};

pub const INDEX_FILE: &str = "staidx0.mul";
pub const DATA_FILE: &str = "statics0.mul";

/// Tiles along each edge of a block.
pub const TILES_PER_BLOCK: u64 = 8;

/// One index entry: where a block's statics live in the data file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Record {
    pub lookup: i32,
    pub length: i32,
    pub extra: i32,
}

impl Record {
    pub const SIZE: usize = 3 * std::mem::size_of::<i32>();

    /// A block with no statics.
    pub const EMPTY: Record = Record {
        lookup: -1,
        length: 0,
        extra: 0,
    };

    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_i32::<LittleEndian>(self.lookup)?;
        w.write_i32::<LittleEndian>(self.length)?;
        w.write_i32::<LittleEndian>(self.extra)
    }
}

/// Map size in blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    blocks_x: u32,
    blocks_y: u32,
}

impl Dimensions {
    pub fn new(blocks_x: u32, blocks_y: u32) -> Result<Self> {
        if blocks_x == 0 || blocks_y == 0 {
            return Err(Error::ZeroBlocks);
        }
        let dims = Self { blocks_x, blocks_y };
        if dims.checked_index_len().is_none() {
            return Err(Error::IndexTooLarge { blocks_x, blocks_y });
        }
        Ok(dims)
    }

    pub fn blocks(&self) -> (u32, u32) {
        (self.blocks_x, self.blocks_y)
    }

    pub fn tiles(&self) -> (u64, u64) {
        (
            u64::from(self.blocks_x) * TILES_PER_BLOCK,
            u64::from(self.blocks_y) * TILES_PER_BLOCK,
        )
    }

    pub fn entries(&self) -> u64 {
        u64::from(self.blocks_x) * u64::from(self.blocks_y)
    }

    /// Size of the index file in bytes.
    pub fn index_len(&self) -> u64 {
        self.entries() * Record::SIZE as u64
    }

    fn checked_index_len(&self) -> Option<u64> {
        self.entries().checked_mul(Record::SIZE as u64)
    }
}

/// Writes an empty index/data file pair into a directory.
pub struct Initializer {
    dir: PathBuf,
}

impl Initializer {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    pub fn data_path(&self) -> PathBuf {
        self.dir.join(DATA_FILE)
    }

    pub fn run(&self, dims: Dimensions) -> Result<Summary> {
        let index_path = self.index_path();
        write_index(&index_path, dims.entries())?;
        info!(
            entries = dims.entries(),
            bytes = dims.index_len(),
            path = %index_path.display(),
            "wrote index"
        );

        let data_path = self.data_path();
        truncate_data(&data_path)?;
        info!(path = %data_path.display(), "truncated data file");

        Ok(Summary {
            dims,
            index_path: resolve(&index_path)?,
            data_path: resolve(&data_path)?,
        })
    }
}

/// Writes `entries` empty records to `path`, replacing whatever was there.
pub fn write_index<P: AsRef<Path>>(path: P, entries: u64) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let write_err = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut fout = BufWriter::new(file);
    for _ in 0..entries {
        Record::EMPTY.write_to(&mut fout).map_err(write_err)?;
    }
    fout.flush().map_err(write_err)?;
    debug!(entries, path = %path.display(), "index flushed");
    Ok(())
}

/// Leaves an empty file at `path`.
pub fn truncate_data<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    File::create(path).map_err(|source| Error::Create {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn resolve(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|source| Error::Resolve {
        path: path.to_path_buf(),
        source,
    })
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct Summary {
    pub dims: Dimensions,
    pub index_path: PathBuf,
    pub data_path: PathBuf,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (bx, by) = self.dims.blocks();
        let (tx, ty) = self.dims.tiles();
        writeln!(f, "Done.")?;
        writeln!(f, "Blocks: {bx} × {by} (tiles: {tx} × {ty})")?;
        writeln!(f, "Entries written: {}", self.dims.entries())?;
        writeln!(f, "{INDEX_FILE} size: {} bytes", self.dims.index_len())?;
        writeln!(f, "Wrote: {}", self.index_path.display())?;
        write!(f, "Wrote: {}", self.data_path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_bytes() {
        let mut buf = Vec::new();
        Record::EMPTY.write_to(&mut buf).unwrap();
        assert_eq!(buf, [0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(buf.len(), Record::SIZE);
    }

    #[test]
    fn write_to_is_little_endian() {
        let record = Record {
            lookup: 0x0102_0304,
            length: -2,
            extra: 7,
        };
        let mut buf = Vec::new();
        record.write_to(&mut buf).unwrap();
        assert_eq!(buf, [4, 3, 2, 1, 0xFE, 0xFF, 0xFF, 0xFF, 7, 0, 0, 0]);
    }

    #[test]
    fn error_text_leaves_cause_to_source() {
        let err = Error::Create {
            path: PathBuf::from("/maps/staidx0.mul"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(err.to_string(), "failed to create /maps/staidx0.mul");
        assert_eq!(
            format!("{:#}", anyhow::Error::from(err)),
            "failed to create /maps/staidx0.mul: disk full"
        );
    }

    #[test]
    fn dimensions_math() {
        let dims = Dimensions::new(2, 3).unwrap();
        assert_eq!(dims.entries(), 6);
        assert_eq!(dims.index_len(), 72);
        assert_eq!(dims.tiles(), (16, 24));
    }

    #[test]
    fn dimensions_use_wide_arithmetic() {
        let dims = Dimensions::new(100_000, 100_000).unwrap();
        assert_eq!(dims.entries(), 10_000_000_000);
        assert_eq!(dims.index_len(), 120_000_000_000);
    }

    #[test]
    fn dimensions_reject_zero() {
        assert!(matches!(Dimensions::new(0, 4), Err(Error::ZeroBlocks)));
        assert!(matches!(Dimensions::new(4, 0), Err(Error::ZeroBlocks)));
    }

    #[test]
    fn dimensions_reject_overflow() {
        assert!(matches!(
            Dimensions::new(u32::MAX, u32::MAX),
            Err(Error::IndexTooLarge { .. })
        ));
    }

    #[test]
    fn summary_report() {
        let summary = Summary {
            dims: Dimensions::new(2, 3).unwrap(),
            index_path: PathBuf::from("/maps/staidx0.mul"),
            data_path: PathBuf::from("/maps/statics0.mul"),
        };
        assert_eq!(
            summary.to_string(),
            "Done.\n\
             Blocks: 2 × 3 (tiles: 16 × 24)\n\
             Entries written: 6\n\
             staidx0.mul size: 72 bytes\n\
             Wrote: /maps/staidx0.mul\n\
             Wrote: /maps/statics0.mul"
        );
    }
}
