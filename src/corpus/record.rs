use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::authors::AuthorId;

/// Publication year as found in the corpus.
///
/// Shards are noisy: the year may be an integer, a float (`2004.0`), a
/// numeric string, or garbage. Anything that cannot be read as a whole year is
/// kept as `Unparseable` so consumers can treat it as unverifiable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicationYear {
    Known(i32),
    Unparseable(String),
}

impl PublicationYear {
    pub fn as_year(&self) -> Option<i32> {
        match self {
            PublicationYear::Known(y) => Some(*y),
            PublicationYear::Unparseable(_) => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawYear {
    Int(i64),
    Float(f64),
    Text(String),
    Other(Value),
}

impl<'de> Deserialize<'de> for PublicationYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let year = match RawYear::deserialize(deserializer)? {
            RawYear::Int(i) => match i32::try_from(i) {
                Ok(y) => PublicationYear::Known(y),
                Err(_) => PublicationYear::Unparseable(i.to_string()),
            },
            RawYear::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() <= i32::MAX as f64 {
                    PublicationYear::Known(f as i32)
                } else {
                    PublicationYear::Unparseable(f.to_string())
                }
            }
            RawYear::Text(s) => match s.trim().parse::<i32>() {
                Ok(y) => PublicationYear::Known(y),
                Err(_) => PublicationYear::Unparseable(s),
            },
            RawYear::Other(v) => PublicationYear::Unparseable(v.to_string()),
        };
        Ok(year)
    }
}

impl Serialize for PublicationYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PublicationYear::Known(y) => serializer.serialize_i32(*y),
            PublicationYear::Unparseable(s) => serializer.serialize_str(s),
        }
    }
}

/// One author entry inside a paper's author list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorMention {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_ids")]
    pub ids: Vec<String>,
}

impl AuthorMention {
    pub fn new(name: &str, ids: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The source-supplied id: first entry of `ids`, if it is numeric.
    /// A non-numeric first id counts as no id at all.
    pub fn primary_id(&self) -> Option<AuthorId> {
        self.ids.first()?.trim().parse().ok()
    }
}

// S2ORC ships ids as strings, other dumps as bare numbers; null means empty.
// Any other element becomes a blank id, which reads as "no id" in its slot.
fn deserialize_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
        .collect())
}

/// A single paper row of the corpus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<PublicationYear>,
    #[serde(default)]
    pub authors: Option<Vec<AuthorMention>>,
    /// Papers citing this one
    #[serde(default)]
    pub in_citations: Option<Vec<String>>,
    /// Papers this one cites
    #[serde(default)]
    pub out_citations: Option<Vec<String>>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub journal_name: Option<String>,
    #[serde(default)]
    pub fields_of_study: Option<Vec<String>>,
    /// Resolved author ids, parallel to `authors`. Filled by the resolver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_ids: Option<Vec<AuthorId>>,
}

impl PaperRecord {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(PublicationYear::Known(year));
        self
    }

    pub fn with_authors(mut self, authors: Vec<AuthorMention>) -> Self {
        self.authors = Some(authors);
        self
    }

    pub fn with_in_citations(mut self, ids: &[&str]) -> Self {
        self.in_citations = Some(ids.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Parseable publication year, if any
    pub fn year(&self) -> Option<i32> {
        self.year.as_ref().and_then(PublicationYear::as_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let line = r#"{"id":"abc","title":"T","year":2004,"authors":[{"name":"Ada Lovelace","ids":["42"]},{"name":"Anon","ids":[]}],"inCitations":["x","y"],"outCitations":[],"venue":"V","journalName":"J","fieldsOfStudy":["Computer Science"]}"#;
        let record: PaperRecord = serde_json::from_str(line).unwrap();

        assert_eq!(record.id, "abc");
        assert_eq!(record.year(), Some(2004));
        let authors = record.authors.as_ref().unwrap();
        assert_eq!(authors[0].primary_id(), Some(42));
        assert_eq!(authors[1].primary_id(), None);
        assert_eq!(record.in_citations.as_ref().unwrap().len(), 2);
        assert!(record.author_ids.is_none());
    }

    #[test]
    fn test_missing_fields_are_none() {
        let record: PaperRecord = serde_json::from_str(r#"{"id":"abc","authors":null}"#).unwrap();
        assert!(record.year.is_none());
        assert!(record.authors.is_none());
        assert!(record.in_citations.is_none());
    }

    #[test]
    fn test_year_variants() {
        let parse = |json: &str| -> PublicationYear { serde_json::from_str(json).unwrap() };

        assert_eq!(parse("1999"), PublicationYear::Known(1999));
        assert_eq!(parse("2004.0"), PublicationYear::Known(2004));
        assert_eq!(parse(r#"" 2010 ""#), PublicationYear::Known(2010));
        assert_eq!(parse("2004.5").as_year(), None);
        assert_eq!(parse(r#""circa 1900""#).as_year(), None);
        assert_eq!(parse("true").as_year(), None);
    }

    #[test]
    fn test_numeric_author_ids_accepted() {
        let mention: AuthorMention = serde_json::from_str(r#"{"name":"N","ids":[7, "8"]}"#).unwrap();
        assert_eq!(mention.ids, vec!["7".to_string(), "8".to_string()]);
        assert_eq!(mention.primary_id(), Some(7));

        let mention: AuthorMention = serde_json::from_str(r#"{"name":"N","ids":null}"#).unwrap();
        assert!(mention.ids.is_empty());
    }

    #[test]
    fn test_null_or_nested_author_ids_mean_no_id() {
        let line = r#"{"id":"abc","authors":[{"name":"A","ids":[null]},{"name":"B","ids":[{"orcid":"x"}, "9"]},{"name":"C","ids":["3", null]}]}"#;
        let record: PaperRecord = serde_json::from_str(line).unwrap();
        let authors = record.authors.unwrap();

        assert_eq!(authors[0].primary_id(), None);
        assert_eq!(authors[1].primary_id(), None);
        assert_eq!(authors[2].primary_id(), Some(3));
    }

    #[test]
    fn test_non_numeric_id_is_no_id() {
        let mention = AuthorMention::new("N", &["orcid:0000"]);
        assert_eq!(mention.primary_id(), None);
    }
}
