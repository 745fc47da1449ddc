//! Per-dataset visibility checks.
//!
//! Every path that hands dataset content to a caller goes through these two
//! functions before a container is opened.

use tileset_common::{DatasetRecord, Requester};

/// A dataset is readable if it is public or the requester owns it.
pub fn can_read(record: &DatasetRecord, requester: &Requester) -> bool {
    !record.private || is_owner(record, requester)
}

/// Only the owner may modify or delete a dataset.
pub fn can_modify(record: &DatasetRecord, requester: &Requester) -> bool {
    is_owner(record, requester)
}

fn is_owner(record: &DatasetRecord, requester: &Requester) -> bool {
    match (requester.id(), record.owner.as_deref()) {
        (Some(who), Some(owner)) => who == owner,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tileset_common::FileType;

    fn record(owner: Option<&str>, private: bool) -> DatasetRecord {
        DatasetRecord {
            uuid: "t".into(),
            name: "t".into(),
            file_path: "t.mpyr".into(),
            file_type: FileType::MatrixPyramid,
            data_type: "matrix".into(),
            coord_system: "hg19".into(),
            coord_system_2: String::new(),
            owner: owner.map(String::from),
            private,
            created: Utc::now(),
        }
    }

    #[test]
    fn test_public_is_readable_by_everyone() {
        let r = record(Some("alice"), false);
        assert!(can_read(&r, &Requester::anonymous()));
        assert!(can_read(&r, &Requester::user("bob")));
        assert!(!can_modify(&r, &Requester::user("bob")));
    }

    #[test]
    fn test_private_is_owner_only() {
        let r = record(Some("alice"), true);
        assert!(can_read(&r, &Requester::user("alice")));
        assert!(!can_read(&r, &Requester::user("bob")));
        assert!(!can_read(&r, &Requester::anonymous()));
        assert!(can_modify(&r, &Requester::user("alice")));
    }

    #[test]
    fn test_ownerless_private_is_hidden() {
        let r = record(None, true);
        assert!(!can_read(&r, &Requester::anonymous()));
        assert!(!can_modify(&r, &Requester::anonymous()));
    }
}
