//! Recommendation records as returned to callers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

pub const ASSESSMENT_NAME: &str = "Assessment Name";
pub const URL: &str = "URL";
pub const REMOTE_TESTING_SUPPORT: &str = "Remote Testing Support";
pub const ADAPTIVE_IRT_SUPPORT: &str = "Adaptive/IRT Support";
pub const DURATION: &str = "Duration";
pub const TEST_TYPE: &str = "Test Type";

/// Keys every record must carry. Exact, case-sensitive.
pub const REQUIRED_KEYS: [&str; 6] = [
    ASSESSMENT_NAME,
    URL,
    REMOTE_TESTING_SUPPORT,
    ADAPTIVE_IRT_SUPPORT,
    DURATION,
    TEST_TYPE,
];

/// Capability flag as the model reported it.
///
/// `"Yes"`/`"No"` are recognised; any other value is kept verbatim in `Other`
/// and serialized back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum SupportFlag {
    Yes,
    No,
    Other(Value),
}

impl SupportFlag {
    pub fn from_value(value: Value) -> Self {
        match value.as_str() {
            Some("Yes") => SupportFlag::Yes,
            Some("No") => SupportFlag::No,
            _ => SupportFlag::Other(value),
        }
    }
}

impl Serialize for SupportFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SupportFlag::Yes => serializer.serialize_str("Yes"),
            SupportFlag::No => serializer.serialize_str("No"),
            SupportFlag::Other(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SupportFlag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(SupportFlag::from_value)
    }
}

/// One assessment suggestion. Unknown keys from the model are kept in `extra`.
///
/// Only key presence is enforced; values are whatever JSON the model sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    #[serde(rename = "Assessment Name")]
    pub assessment_name: Value,
    #[serde(rename = "URL")]
    pub url: Value,
    #[serde(rename = "Remote Testing Support")]
    pub remote_testing_support: SupportFlag,
    #[serde(rename = "Adaptive/IRT Support")]
    pub adaptive_irt_support: SupportFlag,
    #[serde(rename = "Duration")]
    pub duration: Value,
    #[serde(rename = "Test Type")]
    pub test_type: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Why a model object could not become a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordRejection {
    NotAnObject,
    MissingKey(&'static str),
}

impl RecommendationRecord {
    /// Builds a record from one element of the model's JSON array.
    ///
    /// Missing keys are never defaulted: a partial record is rejected.
    pub fn from_json(value: Value) -> Result<Self, RecordRejection> {
        let Value::Object(mut object) = value else {
            return Err(RecordRejection::NotAnObject);
        };

        if let Some(missing) = REQUIRED_KEYS.iter().find(|k| !object.contains_key(**k)) {
            return Err(RecordRejection::MissingKey(*missing));
        }

        let assessment_name = take(&mut object, ASSESSMENT_NAME)?;
        let url = take(&mut object, URL)?;
        let remote_testing_support =
            SupportFlag::from_value(take(&mut object, REMOTE_TESTING_SUPPORT)?);
        let adaptive_irt_support =
            SupportFlag::from_value(take(&mut object, ADAPTIVE_IRT_SUPPORT)?);
        let duration = take(&mut object, DURATION)?;
        let test_type = take(&mut object, TEST_TYPE)?;

        Ok(Self {
            assessment_name,
            url,
            remote_testing_support,
            adaptive_irt_support,
            duration,
            test_type,
            extra: object,
        })
    }
}

fn take(object: &mut Map<String, Value>, key: &'static str) -> Result<Value, RecordRejection> {
    object.remove(key).ok_or(RecordRejection::MissingKey(key))
}
