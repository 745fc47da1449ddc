//! Chromosome size tables.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tileset_common::{TileCoords, TileError, TilePayload, TilesetInfo, Transform};

use super::TileReader;
use crate::Result;

/// A chromosome and its position on the concatenated genome axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChromEntry {
    pub name: String,
    pub size: u64,
    pub offset: u64,
}

/// A parsed chrom-sizes file.
#[derive(Debug, Clone)]
pub struct ChromSizes {
    path: PathBuf,
    entries: Vec<ChromEntry>,
}

impl ChromSizes {
    /// Read and parse a TSV or CSV file of `name<sep>length` lines.
    pub async fn open(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        let entries = Self::parse(&text).map_err(|reason| TileError::malformed(path.display(), reason))?;
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Parse file contents. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> std::result::Result<Vec<ChromEntry>, String> {
        let mut entries = Vec::new();
        let mut offset = 0u64;

        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split(|c: char| c == '\t' || c == ',');
            let name = fields.next().unwrap_or_default().trim();
            let size = fields
                .next()
                .map(str::trim)
                .ok_or_else(|| format!("line {}: missing length", lineno + 1))?;
            let size: u64 = size
                .parse()
                .map_err(|_| format!("line {}: invalid length '{}'", lineno + 1, size))?;
            if name.is_empty() {
                return Err(format!("line {}: missing chromosome name", lineno + 1));
            }

            entries.push(ChromEntry {
                name: name.to_string(),
                size,
                offset,
            });
            offset = offset
                .checked_add(size)
                .ok_or_else(|| format!("line {}: total length overflows", lineno + 1))?;
        }

        if entries.is_empty() {
            return Err("no chromosomes".to_string());
        }
        Ok(entries)
    }

    pub fn entries(&self) -> &[ChromEntry] {
        &self.entries
    }

    pub fn total_length(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    /// Render as tab-separated `name\tlength` lines.
    pub fn to_tsv(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}\t{}\n", e.name, e.size))
            .collect()
    }
}

#[async_trait]
impl TileReader for ChromSizes {
    async fn tileset_info(&self) -> Result<TilesetInfo> {
        let total = self.total_length();
        let mut info = TilesetInfo::new(vec![0.0], vec![total as f64], 0, total as f64, total.max(1));
        info.chromsizes = Some(
            self.entries
                .iter()
                .map(|e| (e.name.clone(), e.size))
                .collect(),
        );
        Ok(info)
    }

    async fn read_tile(
        &self,
        _zoom: u32,
        _coords: TileCoords,
        _transform: &Transform,
    ) -> Result<TilePayload> {
        Err(TileError::not_found(format!(
            "chrom-sizes file {} has no tiles",
            self.path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tsv_and_csv() {
        let entries = ChromSizes::parse("chr1\t1000\n\n# comment\nchr2,500\n").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].name, "chr2");
        assert_eq!(entries[1].offset, 1000);
    }

    #[test]
    fn test_parse_errors() {
        assert!(ChromSizes::parse("").is_err());
        assert!(ChromSizes::parse("chr1\n").is_err());
        assert!(ChromSizes::parse("chr1\tlots\n").is_err());
        assert!(ChromSizes::parse("\t100\n").is_err());
        assert!(ChromSizes::parse(&format!("chr1\t{}\nchr2\t1\n", u64::MAX)).is_err());
    }

    #[tokio::test]
    async fn test_open_and_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hg19.chrom.sizes");
        std::fs::write(&path, "chr1\t249250621\nchr2\t243199373\n").unwrap();

        let sizes = ChromSizes::open(&path).await.unwrap();
        assert_eq!(sizes.total_length(), 249250621 + 243199373);
        assert_eq!(sizes.to_tsv(), "chr1\t249250621\nchr2\t243199373\n");

        let info = sizes.tileset_info().await.unwrap();
        assert_eq!(info.chromsizes.unwrap()[0].0, "chr1");

        let err = sizes
            .read_tile(0, TileCoords::OneD(0), &Transform::Default)
            .await
            .unwrap_err();
        assert!(matches!(err, TileError::NotFound(_)));
    }
}
