use serde::{Deserialize, Deserializer};

/// Envelope of `GET /latest`.
#[derive(Debug, Deserialize)]
pub struct StockApiResponse {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub code: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub msg: Option<String>,
    #[serde(default)]
    pub response: Vec<StockItem>,
    #[serde(default)]
    pub info: Option<ApiInfo>,
}

/// One quote. The provider sends most values as strings, occasionally as
/// numbers, so every field is read leniently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockItem {
    /// current price
    #[serde(default, deserialize_with = "lenient_string")]
    pub c: Option<String>,
    /// high
    #[serde(default, deserialize_with = "lenient_string")]
    pub h: Option<String>,
    /// low
    #[serde(default, deserialize_with = "lenient_string")]
    pub l: Option<String>,
    /// change
    #[serde(default, deserialize_with = "lenient_string")]
    pub ch: Option<String>,
    /// change percent, e.g. "2.5%"
    #[serde(default, deserialize_with = "lenient_string")]
    pub cp: Option<String>,
    /// unix timestamp
    #[serde(default, deserialize_with = "lenient_string")]
    pub t: Option<String>,
    /// symbol
    #[serde(default, deserialize_with = "lenient_string")]
    pub s: Option<String>,
    /// country
    #[serde(default, deserialize_with = "lenient_string")]
    pub cty: Option<String>,
    /// currency
    #[serde(default, deserialize_with = "lenient_string")]
    pub ccy: Option<String>,
    /// exchange
    #[serde(default, deserialize_with = "lenient_string")]
    pub exch: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    /// `yyyy-MM-dd HH:mm:ss`
    #[serde(default, deserialize_with = "lenient_string")]
    pub tm: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub server_time: Option<String>,
    #[serde(default)]
    pub credit_count: Option<i64>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_envelope_with_mixed_value_types() {
        let json = r#"{
            "status": true,
            "code": 200,
            "msg": "Successfully",
            "response": [
                { "c": "170.25", "cp": "1.2%", "s": "BALN", "ccy": "CHF",
                  "exch": "Switzerland", "tm": "2025-07-04 17:25:32", "id": 42 }
            ],
            "info": { "server_time": "2025-07-04 17:30:00 UTC", "credit_count": 1 }
        }"#;

        let resp: StockApiResponse = serde_json::from_str(json).unwrap();

        assert!(resp.status);
        assert_eq!(resp.response.len(), 1);
        assert_eq!(resp.response[0].id.as_deref(), Some("42"));
        assert_eq!(resp.info.unwrap().credit_count, Some(1));
    }

    #[test]
    fn error_envelope_has_no_items() {
        let json = r#"{ "status": false, "code": 101, "msg": "Invalid access key" }"#;
        let resp: StockApiResponse = serde_json::from_str(json).unwrap();

        assert!(!resp.status);
        assert!(resp.response.is_empty());
        assert_eq!(resp.msg.as_deref(), Some("Invalid access key"));
    }
}
