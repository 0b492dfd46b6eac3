use std::collections::HashSet;

use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Separator used by the permit feed inside `fooditems`.
pub const FOOD_ITEMS_DELIMITER: char = ':';

/// One permit as it arrives from the feed.
///
/// Only the attributes the view works with are typed; everything else
/// (coordinates, schedule, expiration date, ...) is kept in `extra` untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub objectid: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub applicant: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub facilitytype: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fooditems: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub permit: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A display-ready permit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    pub id: String,
    pub applicant: Option<String>,
    pub facility_type: String,
    pub food_items: String,
    pub address: Option<String>,
    pub status: Option<String>,
    pub permit: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// the feed is not consistent about scalar types: ids are strings in the live
// dataset but numbers in older exports, so anything scalar is stringified.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Turns `"Tacos: Burritos : :Soda"` into `"Tacos, Burritos, Soda"`.
///
/// Applying it to its own output returns the same string.
pub fn normalize_food_items(raw: &str) -> String {
    raw.split(FOOD_ITEMS_DELIMITER)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .join(", ")
}

/// Serialized names of the typed `Record` fields. Passthrough keys with
/// these names would be written twice on export, so they are dropped.
const RECORD_FIELDS: [&str; 7] = [
    "id",
    "applicant",
    "facility_type",
    "food_items",
    "address",
    "status",
    "permit",
];

impl Record {
    /// Builds the display record. `index` is the position in the feed and is
    /// only used to synthesize an id when `objectid` is missing.
    pub fn from_raw(raw: RawRecord, index: usize) -> Self {
        let id = raw
            .objectid
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("row-{index}"));
        let mut extra = raw.extra;
        extra.retain(|key, _| {
            let shadowed = RECORD_FIELDS.contains(&key.as_str());
            if shadowed {
                debug!("permit '{id}': dropping passthrough key '{key}'");
            }
            !shadowed
        });
        Self {
            id,
            applicant: raw.applicant,
            facility_type: raw.facilitytype.unwrap_or_default(),
            food_items: normalize_food_items(raw.fooditems.as_deref().unwrap_or_default()),
            address: raw.address,
            status: raw.status,
            permit: raw.permit.unwrap_or_default(),
            extra,
        }
    }
}

/// Decodes and normalizes the fetched array.
///
/// Elements that are not objects and records whose id was already seen are
/// dropped with a warning; the rest of the set is kept.
pub fn normalize_records(values: Vec<Value>) -> Vec<Record> {
    let total = values.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(total);
    let mut records = Vec::with_capacity(total);

    for (index, value) in values.into_iter().enumerate() {
        let raw = match serde_json::from_value::<RawRecord>(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping permit #{index}: {e}");
                continue;
            }
        };
        let record = Record::from_raw(raw, index);
        if !seen.insert(record.id.clone()) {
            warn!("skipping permit #{index}: duplicate id '{}'", record.id);
            continue;
        }
        records.push(record);
    }

    debug!("normalized {} of {} permits", records.len(), total);
    records
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn food_items_are_split_trimmed_and_joined() {
        assert_eq!(
            normalize_food_items("Cold Truck: Sandwiches:  :Noodles: Soda "),
            "Cold Truck, Sandwiches, Noodles, Soda"
        );
        assert_eq!(normalize_food_items(""), "");
        assert_eq!(normalize_food_items(" : : "), "");
    }

    #[test]
    fn food_items_normalization_is_idempotent() {
        for raw in ["Tacos: Burritos:Soda", "Donuts", "", "a::b", "Hot dogs, chips: lemonade"] {
            let once = normalize_food_items(raw);
            assert_eq!(normalize_food_items(&once), once);
        }
    }

    #[test]
    fn missing_food_items_become_empty() {
        let raw: RawRecord = serde_json::from_value(json!({
            "objectid": "1",
            "applicant": "Nobody's Cart",
        }))
        .unwrap();
        let record = Record::from_raw(raw, 0);
        assert_eq!(record.food_items, "");
        assert_eq!(record.facility_type, "");
        assert_eq!(record.address, None);
    }

    #[test]
    fn numeric_ids_and_passthrough_fields_survive() {
        let raw: RawRecord = serde_json::from_value(json!({
            "objectid": 123,
            "applicant": "Bob's Donut Truck",
            "fooditems": "Donuts: Coffee",
            "latitude": "37.79",
            "dayshours": "Mo-Fr:6AM-11AM",
        }))
        .unwrap();
        let record = Record::from_raw(raw, 7);
        assert_eq!(record.id, "123");
        assert_eq!(record.food_items, "Donuts, Coffee");
        assert_eq!(record.extra.get("latitude"), Some(&json!("37.79")));
        assert_eq!(record.extra.get("dayshours"), Some(&json!("Mo-Fr:6AM-11AM")));
    }

    #[test]
    fn passthrough_keys_never_shadow_typed_fields() {
        let raw: RawRecord = serde_json::from_value(json!({
            "objectid": "1",
            "fooditems": "Tacos",
            "id": "other",
            "food_items": "x",
            "facility_type": "Boat",
            "zip": "94105",
        }))
        .unwrap();
        let record = Record::from_raw(raw, 0);
        assert_eq!(record.extra.len(), 1);
        assert_eq!(record.extra.get("zip"), Some(&json!("94105")));

        let out = serde_json::to_string(&record).unwrap();
        assert_eq!(out.matches("\"id\"").count(), 1);
        assert_eq!(out.matches("\"food_items\"").count(), 1);
        let back: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(back["id"], json!("1"));
        assert_eq!(back["food_items"], json!("Tacos"));
        assert_eq!(back["facility_type"], json!(""));
    }

    #[test]
    fn bad_elements_do_not_abort_the_set() {
        let records = normalize_records(vec![
            json!({"objectid": "1", "applicant": "A"}),
            json!(42),
            json!({"objectid": "1", "applicant": "dup"}),
            json!({"applicant": "no id"}),
        ]);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "row-3"]);
        assert_eq!(records[0].applicant.as_deref(), Some("A"));
    }
}
