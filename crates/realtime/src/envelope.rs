use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use votecast_products::{Counts, ProductId};

/// Message type tag of a vote-count update.
pub const VOTES_UPDATE: &str = "votes.update";

/// Pushed to every viewer of a product when its counts change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteUpdate {
    #[serde(rename = "type")]
    pub kind: String,
    pub product_id: String,
    pub counts: Counts,
    pub server_time: DateTime<Utc>,
}

impl VoteUpdate {
    pub fn new(product_id: ProductId, counts: Counts, server_time: DateTime<Utc>) -> Self {
        Self {
            kind: VOTES_UPDATE.to_string(),
            product_id: product_id.to_string(),
            counts,
            server_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votecast_core::DocumentId;

    #[test]
    fn wire_format_has_type_tag_and_rfc3339_time() {
        let id = ProductId::new(DocumentId::new());
        let update = VoteUpdate::new(id, Counts::zeroed(), Utc::now());

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["type"], "votes.update");
        assert_eq!(json["product_id"], id.to_string());
        assert_eq!(json["counts"]["not_interested"], 0);

        let time = json["server_time"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(time).is_ok());
    }
}
