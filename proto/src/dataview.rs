use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A decoded struct value, the currency of record rows and details maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Text(s.to_string()) }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Number(n) }
}

/// A dataview row, keyed by relation key. The `id` entry identifies the row.
pub type Record = BTreeMap<String, Value>;

pub fn record_id(record: &Record) -> Option<&str> { record.get("id").and_then(Value::as_text) }

/// A typed column descriptor for a dataview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub key: String,
    pub name: String,
    pub format: RelationFormat,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RelationFormat {
    #[default]
    ShortText,
    LongText,
    Number,
    Status,
    Date,
    File,
    Checkbox,
    Url,
    Email,
    Phone,
    Tag,
    Object,
}

/// How one relation is projected into one view (column visibility/sizing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRelation {
    pub key: String,
    pub visible: bool,
    pub width: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewLayout {
    #[default]
    Grid,
    List,
    Gallery,
    Kanban,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    pub relation_key: String,
    #[serde(default)]
    pub desc: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub relation_key: String,
    pub condition: FilterCondition,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterCondition {
    Equal,
    NotEqual,
    Like,
    NotLike,
    Greater,
    Less,
    In,
    Empty,
    NotEmpty,
}

/// A saved filter/sort/layout configuration over a dataview's records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub layout: ViewLayout,
    #[serde(default)]
    pub sorts: Vec<Sort>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub relations: Vec<ViewRelation>,
}

/// Per-(context, dataview-block) metadata: the active view and the authority's
/// record total.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataviewMeta {
    pub view_id: String,
    pub total: u32,
}
