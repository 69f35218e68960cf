use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DatasetError;

/// Which candidate is the better match for the anchor text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Label {
    /// B is closer to A. Assumed when no label is given.
    #[default]
    B,
    /// C is closer to A.
    C,
}

impl Label {
    /// Class index used by the classifier: `B → 0`, `C → 1`.
    pub fn index(self) -> u32 {
        match self {
            Label::B => 0,
            Label::C => 1,
        }
    }

    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Label::B),
            1 => Some(Label::C),
            _ => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Label::B => Label::C,
            Label::C => Label::B,
        }
    }
}

impl FromStr for Label {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "B" => Ok(Label::B),
            "C" => Ok(Label::C),
            other => Err(DatasetError::InvalidLabel {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::B => write!(f, "B"),
            Label::C => write!(f, "C"),
        }
    }
}

/// One labelled triplet: is `text_b` or `text_c` closer to `text_a`?
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TripletExample {
    pub text_a: String,
    pub text_b: String,
    pub text_c: String,
    pub label: Label,
}

impl TripletExample {
    pub fn new(
        text_a: impl Into<String>,
        text_b: impl Into<String>,
        text_c: impl Into<String>,
        label: Label,
    ) -> Self {
        Self {
            text_a: text_a.into(),
            text_b: text_b.into(),
            text_c: text_c.into(),
            label,
        }
    }

    /// Returns `(anchor, closer, farther)` regardless of which slot holds the closer text.
    pub fn roles(&self) -> (&str, &str, &str) {
        match self.label {
            Label::B => (&self.text_a, &self.text_b, &self.text_c),
            Label::C => (&self.text_a, &self.text_c, &self.text_b),
        }
    }
}

impl From<TripletRecord> for TripletExample {
    fn from(record: TripletRecord) -> Self {
        Self {
            text_a: record.a,
            text_b: record.b,
            text_c: record.c,
            label: record.label.unwrap_or_default(),
        }
    }
}

/// Input record, one per JSON line: `{"A": .., "B": .., "C": .., "label"?: "B"|"C"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripletRecord {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
}

/// Column-oriented triplets; a missing label column means every row is `B`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripletColumns {
    pub a: Vec<String>,
    pub b: Vec<String>,
    pub c: Vec<String>,
    pub label: Option<Vec<Label>>,
}

impl From<Vec<TripletRecord>> for TripletColumns {
    fn from(records: Vec<TripletRecord>) -> Self {
        let has_labels = records.iter().any(|r| r.label.is_some());
        let mut columns = TripletColumns {
            label: has_labels.then(|| Vec::with_capacity(records.len())),
            ..Default::default()
        };

        for record in records {
            columns.a.push(record.a);
            columns.b.push(record.b);
            columns.c.push(record.c);
            if let Some(labels) = columns.label.as_mut() {
                labels.push(record.label.unwrap_or_default());
            }
        }

        columns
    }
}
