//! Catalog listing, name suggestions, filename lookup and chrom sizes.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use container_reader::{ChromEntry, ChromSizes, Suggestion};
use serde::Serialize;
use tileset_common::{DatasetFilter, DatasetRecord, FileType, Requester, TileError, TileResult};
use tracing::{debug, warn};

use crate::access;
use crate::service::TileService;

/// Fields a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Uuid,
    Name,
    FileType,
    DataType,
    CoordSystem,
    CoordSystem2,
    Created,
    Private,
}

impl OrderField {
    /// Parse a public field name.
    pub fn parse(name: &str) -> TileResult<Self> {
        match name {
            "uuid" => Ok(Self::Uuid),
            "name" => Ok(Self::Name),
            "filetype" => Ok(Self::FileType),
            "datatype" => Ok(Self::DataType),
            "coordSystem" => Ok(Self::CoordSystem),
            "coordSystem2" => Ok(Self::CoordSystem2),
            "created" => Ok(Self::Created),
            "private" => Ok(Self::Private),
            other => Err(TileError::invalid_parameter(
                "o",
                format!("cannot order by '{}'", other),
            )),
        }
    }

    fn compare(&self, a: &DatasetRecord, b: &DatasetRecord) -> Ordering {
        match self {
            Self::Uuid => a.uuid.cmp(&b.uuid),
            Self::Name => a.name.cmp(&b.name),
            Self::FileType => a.file_type.as_str().cmp(b.file_type.as_str()),
            Self::DataType => a.data_type.cmp(&b.data_type),
            Self::CoordSystem => a.coord_system.cmp(&b.coord_system),
            Self::CoordSystem2 => a.coord_system_2.cmp(&b.coord_system_2),
            Self::Created => a.created.cmp(&b.created),
            Self::Private => a.private.cmp(&b.private),
        }
    }
}

/// A listing request.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filter: DatasetFilter,
    /// Public field name; `None` orders by uuid.
    pub order_by: Option<String>,
    /// Reverse the primary ordering. Ties stay uuid-ascending.
    pub reverse: bool,
    pub offset: usize,
    /// Page size; the configured default when `None`.
    pub limit: Option<usize>,
}

/// A page of results and the total before paging.
#[derive(Debug, Clone, Serialize)]
pub struct ListResult<T> {
    pub count: usize,
    pub results: Vec<T>,
}

/// Output rendering for chrom sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromSizesFormat {
    #[default]
    Tsv,
    Json,
}

impl ChromSizesFormat {
    pub fn parse(s: &str) -> TileResult<Self> {
        match s.to_lowercase().as_str() {
            "tsv" | "" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            other => Err(TileError::invalid_parameter(
                "type",
                format!("unknown chrom sizes format '{}'", other),
            )),
        }
    }
}

/// Size and genome-axis offset of one chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChromPosition {
    pub size: u64,
    pub offset: u64,
}

/// Chrom sizes rendered for a client.
#[derive(Debug, Clone, PartialEq)]
pub enum ChromSizesBody {
    Tsv(String),
    Json(BTreeMap<String, ChromPosition>),
}

impl TileService {
    /// List visible datasets matching a query.
    pub async fn list_datasets(
        &self,
        requester: &Requester,
        query: &ListQuery,
    ) -> TileResult<ListResult<DatasetRecord>> {
        let order = match &query.order_by {
            Some(name) => OrderField::parse(name)?,
            None => OrderField::Uuid,
        };

        let mut records = self.visible_datasets(requester, &query.filter).await?;
        records.sort_by(|a, b| {
            let primary = order.compare(a, b);
            let primary = if query.reverse { primary.reverse() } else { primary };
            primary.then_with(|| a.uuid.cmp(&b.uuid))
        });

        let count = records.len();
        let limit = query.limit.unwrap_or(self.config.default_page_size);
        let results = records.into_iter().skip(query.offset).take(limit).collect();

        Ok(ListResult { count, results })
    }

    /// Features of an annotation dataset whose names contain `text`.
    ///
    /// Anything that cannot be searched (unknown id, private, wrong type,
    /// unreadable file) yields an empty list.
    pub async fn suggest(&self, requester: &Requester, uuid: &str, text: &str) -> TileResult<Vec<Suggestion>> {
        let record = match self.datasets.get_dataset(uuid).await? {
            Some(record) => record,
            None => return Ok(Vec::new()),
        };
        if !record.file_type.is_annotation() || !access::can_read(&record, requester) {
            debug!(uuid = %uuid, file_type = %record.file_type, "Suggest not available");
            return Ok(Vec::new());
        }

        let handle = match self.open_container(&record).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(uuid = %uuid, error = %e, "Cannot open annotation dataset");
                return Ok(Vec::new());
            }
        };
        let Some(db) = handle.as_intervals() else {
            return Ok(Vec::new());
        };

        match db.suggest(text, self.config.suggestion_limit).await {
            Ok(hits) => Ok(hits),
            Err(e) => {
                warn!(uuid = %uuid, error = %e, "Suggest query failed");
                Ok(Vec::new())
            }
        }
    }

    /// Ids of visible datasets whose file basename is exactly `file_name`.
    pub async fn uids_by_filename(&self, requester: &Requester, file_name: &str) -> TileResult<ListResult<String>> {
        let filter = DatasetFilter {
            file_name: Some(file_name.to_string()),
            ..Default::default()
        };
        let results: Vec<String> = self
            .visible_datasets(requester, &filter)
            .await?
            .into_iter()
            .filter(|r| r.file_name() == file_name)
            .map(|r| r.uuid)
            .collect();

        Ok(ListResult {
            count: results.len(),
            results,
        })
    }

    /// Visible chrom-sizes datasets.
    pub async fn available_chrom_sizes(&self, requester: &Requester) -> TileResult<ListResult<DatasetRecord>> {
        let filter = DatasetFilter {
            file_type: Some(FileType::ChromSizes),
            ..Default::default()
        };
        let results = self.visible_datasets(requester, &filter).await?;
        Ok(ListResult {
            count: results.len(),
            results,
        })
    }

    /// Chromosome sizes of a dataset.
    ///
    /// Chrom-sizes files are read directly. Other tiled datasets answer from
    /// the chromosome list in their tileset info, if they carry one.
    pub async fn chrom_sizes(
        &self,
        requester: &Requester,
        uuid: &str,
        format: ChromSizesFormat,
    ) -> TileResult<ChromSizesBody> {
        let record = self.readable_dataset(requester, uuid).await?;
        let handle = self.open_container(&record).await?;

        let entries: Vec<ChromEntry> = match handle.as_chromsizes() {
            Some(sizes) => sizes.entries().to_vec(),
            None => {
                let info = handle.tileset_info().await?;
                let pairs = info.chromsizes.ok_or_else(|| {
                    TileError::invalid_parameter("id", format!("tileset {} has no chromosome sizes", uuid))
                })?;
                let text: String = pairs.iter().map(|(name, size)| format!("{}\t{}\n", name, size)).collect();
                ChromSizes::parse(&text).map_err(|reason| TileError::malformed(&record.file_path, reason))?
            }
        };

        Ok(match format {
            ChromSizesFormat::Tsv => ChromSizesBody::Tsv(
                entries
                    .iter()
                    .map(|e| format!("{}\t{}\n", e.name, e.size))
                    .collect(),
            ),
            ChromSizesFormat::Json => ChromSizesBody::Json(
                entries
                    .into_iter()
                    .map(|e| {
                        (
                            e.name,
                            ChromPosition {
                                size: e.size,
                                offset: e.offset,
                            },
                        )
                    })
                    .collect(),
            ),
        })
    }

    async fn visible_datasets(&self, requester: &Requester, filter: &DatasetFilter) -> TileResult<Vec<DatasetRecord>> {
        let mut records = self.datasets.find_datasets(filter).await?;
        records.retain(|r| access::can_read(r, requester));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_field_parse() {
        assert_eq!(OrderField::parse("coordSystem2").unwrap(), OrderField::CoordSystem2);
        assert!(matches!(
            OrderField::parse("owner"),
            Err(TileError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_chrom_sizes_format_parse() {
        assert_eq!(ChromSizesFormat::parse("JSON").unwrap(), ChromSizesFormat::Json);
        assert_eq!(ChromSizesFormat::parse("").unwrap(), ChromSizesFormat::Tsv);
        assert!(ChromSizesFormat::parse("xml").is_err());
    }
}
