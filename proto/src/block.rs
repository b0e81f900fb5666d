use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataview::{Relation, Value, View};

/// Free-form key/value payload attached to a block (layout hints, link
/// parameters and the like).
pub type Fields = BTreeMap<String, Value>;

/// Object-level details for a context (title, icon, layout, object type...).
pub type Details = BTreeMap<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailsEntry {
    pub id: String,
    pub details: Details,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// One node of the document graph. The `parent_id` is authoritative only
/// inside the store; on the wire it may be absent and is recovered from the
/// per-batch structural index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub children_ids: Vec<String>,
    #[serde(default)]
    pub background_color: String,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub fields: Fields,
    pub content: BlockContent,
}

impl Block {
    pub fn new(id: impl Into<String>, content: BlockContent) -> Self {
        Self {
            id: id.into(),
            parent_id: String::new(),
            children_ids: Vec::new(),
            background_color: String::new(),
            align: Align::default(),
            fields: Fields::new(),
            content,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BlockContent {
    Page(PageContent),
    Layout,
    Text(TextContent),
    File(FileContent),
    Link(LinkContent),
    Bookmark(BookmarkContent),
    Div(DivContent),
    Relation(RelationContent),
    Dataview(DataviewContent),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageContent {
    pub layout: ObjectLayout,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
    pub style: TextStyle,
    pub marks: Vec<Mark>,
    pub checked: bool,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextStyle {
    #[default]
    Paragraph,
    Header1,
    Header2,
    Header3,
    Quote,
    Code,
    Title,
    Checkbox,
    Bulleted,
    Numbered,
    Toggle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub from: u32,
    pub to: u32,
    pub kind: MarkKind,
    #[serde(default)]
    pub param: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkKind {
    Bold,
    Italic,
    Strikethrough,
    Underline,
    Code,
    Link,
    TextColor,
    BackgroundColor,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileContent {
    pub name: String,
    pub hash: String,
    pub mime: String,
    pub size: u64,
    pub kind: FileKind,
    pub state: FileState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FileKind {
    #[default]
    File,
    Image,
    Video,
    Audio,
    Pdf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FileState {
    #[default]
    Empty,
    Uploading,
    Done,
    Error,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkContent {
    pub target_id: String,
    pub fields: Fields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmarkContent {
    pub url: String,
    pub title: String,
    pub description: String,
    pub image_hash: String,
    pub favicon_hash: String,
    pub kind: BookmarkKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BookmarkKind {
    #[default]
    Unknown,
    Page,
    Image,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DivStyle {
    #[default]
    Line,
    Dot,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DivContent {
    pub style: DivStyle,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationContent {
    pub key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataviewContent {
    pub source: String,
    pub views: Vec<View>,
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObjectLayout {
    #[default]
    Page,
    Profile,
    Todo,
    Set,
}

impl ObjectLayout {
    /// Layouts are carried in details as a numeric code.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Page),
            1 => Some(Self::Profile),
            2 => Some(Self::Todo),
            3 => Some(Self::Set),
            _ => None,
        }
    }
}

/// A type from the object-type catalog; resolving a context's layout falls
/// back to its object type when the details carry none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectType {
    pub id: String,
    pub name: String,
    pub layout: ObjectLayout,
}
