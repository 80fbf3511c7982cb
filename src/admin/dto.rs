use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SetBannedBody {
    pub banned: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnnouncementBody {
    pub message: String,
}

/// limit/offset paging for the admin listings.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Pagination {
    /// Query values reach LIMIT/OFFSET as-is, and Postgres rejects negative
    /// ones; clamp instead of surfacing a database error.
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.max(0), self.offset.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.limit, 20);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn pagination_clamps_negative_values() {
        let p = Pagination {
            limit: -5,
            offset: -100,
        };
        assert_eq!(p.clamped(), (0, 0));

        let p = Pagination {
            limit: 50,
            offset: 10,
        };
        assert_eq!(p.clamped(), (50, 10));
    }
}
