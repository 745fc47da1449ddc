//! Dataset and view-config creation, dataset deletion.

use chrono::Utc;
use tileset_common::{DatasetRecord, FileType, NewDataset, Requester, TileError, TileResult, ViewConf};
use tracing::info;
use uuid::Uuid;

use crate::access;
use crate::metrics;
use crate::service::TileService;

/// A fresh server-side id.
pub fn generate_uid() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Check a client-supplied id. Ids become the first field of tile
/// addresses, so they cannot contain dots.
fn validate_uid(param: &str, uid: &str) -> TileResult<()> {
    if uid.contains('.') || uid.chars().any(char::is_whitespace) {
        return Err(TileError::invalid_parameter(
            param,
            format!("'{}' may not contain dots or whitespace", uid),
        ));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl TileService {
    /// Register a new dataset owned by the requester.
    pub async fn create_dataset(&self, requester: &Requester, new: NewDataset) -> TileResult<DatasetRecord> {
        if !self.config.upload_enabled {
            return Err(TileError::permission_denied("uploads are disabled"));
        }
        let owner = requester
            .id()
            .ok_or_else(|| TileError::permission_denied("anonymous users cannot create tilesets"))?
            .to_string();

        let file_type = FileType::parse(new.file_type.trim());
        let coord_system = non_blank(new.coord_system);
        if coord_system.is_none() && file_type != FileType::ChromSizes {
            return Err(TileError::invalid_parameter(
                "coordSystem",
                "required for all file types except chromsizes",
            ));
        }
        if new.file_path.trim().is_empty() {
            return Err(TileError::invalid_parameter("datafile", "required"));
        }

        let uuid = match non_blank(new.uuid) {
            Some(uuid) => {
                validate_uid("uid", &uuid)?;
                uuid
            }
            None => generate_uid(),
        };

        let mut record = DatasetRecord {
            uuid,
            name: String::new(),
            file_path: new.file_path.trim().to_string(),
            file_type,
            data_type: non_blank(new.data_type).unwrap_or_default(),
            coord_system: coord_system.unwrap_or_default(),
            coord_system_2: non_blank(new.coord_system_2).unwrap_or_default(),
            owner: Some(owner),
            private: new.private.unwrap_or(true),
            created: Utc::now(),
        };
        record.name = non_blank(new.name).unwrap_or_else(|| record.file_name().to_string());

        let record = self.datasets.create_dataset(record).await?;
        metrics::record_dataset_created(record.file_type.as_str());
        info!(
            uuid = %record.uuid,
            file_type = %record.file_type,
            owner = %requester,
            private = record.private,
            "Created tileset"
        );
        Ok(record)
    }

    /// Delete a dataset the requester owns and drop its open container.
    pub async fn delete_dataset(&self, requester: &Requester, uuid: &str) -> TileResult<()> {
        let record = self.require_dataset(uuid).await?;
        if !access::can_modify(&record, requester) {
            return Err(TileError::permission_denied(format!(
                "only the owner can delete tileset {}",
                uuid
            )));
        }

        if !self.datasets.delete_dataset(uuid).await? {
            return Err(TileError::not_found(format!("No such tileset with uid: {}", uuid)));
        }
        self.handles.invalidate(&self.resolve_path(&record.file_path)).await;

        metrics::record_dataset_deleted();
        info!(uuid = %uuid, owner = %requester, "Deleted tileset");
        Ok(())
    }

    /// Store a view config under `uid`, or a generated id.
    pub async fn create_viewconf(&self, uid: Option<String>, document: serde_json::Value) -> TileResult<ViewConf> {
        if !self.config.upload_enabled {
            return Err(TileError::permission_denied("uploads are disabled"));
        }
        let uuid = match non_blank(uid) {
            Some(uid) => {
                validate_uid("uid", &uid)?;
                uid
            }
            None => generate_uid(),
        };

        self.viewconfs
            .create_viewconf(ViewConf {
                uuid,
                document,
                created: Utc::now(),
            })
            .await
    }

    pub async fn get_viewconf(&self, uuid: &str) -> TileResult<ViewConf> {
        self.viewconfs
            .get_viewconf(uuid)
            .await?
            .ok_or_else(|| TileError::not_found(format!("No such view config: {}", uuid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_uid_is_simple() {
        let uid = generate_uid();
        assert_eq!(uid.len(), 32);
        assert!(uid.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(uid, generate_uid());
    }

    #[test]
    fn test_validate_uid() {
        assert!(validate_uid("uid", "abc-123_X").is_ok());
        assert!(validate_uid("uid", "a.b").is_err());
        assert!(validate_uid("uid", "a b").is_err());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  x ".into())), Some("x".to_string()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
