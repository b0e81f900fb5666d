use serde::{Deserialize, Serialize};

use crate::{
    account::{Account, ThreadAccount, ThreadCafe, ThreadSummary},
    block::{Align, Block, BookmarkKind, Details, DetailsEntry, DivStyle, FileKind, FileState, Fields, Mark, ObjectType, TextStyle},
    dataview::{Record, Relation, View},
    process::Process,
};

/// Logical operation kinds. Every wire message maps to exactly one of these;
/// discriminators we don't recognize map to [`MessageKind::Unknown`] and the
/// message is skipped downstream. Classification never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    AccountShow,
    ThreadStatus,
    BlockShow,
    BlockAdd,
    BlockDelete,
    BlockSetChildrenIds,
    BlockSetFields,
    BlockSetDetails,
    BlockSetText,
    BlockSetFile,
    BlockSetLink,
    BlockSetBookmark,
    BlockSetDiv,
    BlockSetBackgroundColor,
    BlockSetAlign,
    BlockSetRelation,
    BlockSetRelations,
    BlockDataviewViewSet,
    BlockDataviewViewDelete,
    BlockDataviewRelationSet,
    BlockDataviewRelationDelete,
    BlockDataviewRecordsSet,
    BlockDataviewRecordsInsert,
    BlockDataviewRecordsUpdate,
    BlockDataviewRecordsDelete,
    ProcessNew,
    ProcessUpdate,
    ProcessDone,
    Unknown,
}

impl MessageKind {
    /// Map an envelope discriminator to a kind. Total: unrecognized tags land
    /// on `Unknown`.
    pub fn from_tag(tag: u16) -> Self {
        match tag {
            1 => Self::AccountShow,
            2 => Self::ThreadStatus,
            3 => Self::BlockShow,
            10 => Self::BlockAdd,
            11 => Self::BlockDelete,
            12 => Self::BlockSetChildrenIds,
            13 => Self::BlockSetFields,
            14 => Self::BlockSetDetails,
            15 => Self::BlockSetText,
            16 => Self::BlockSetFile,
            17 => Self::BlockSetLink,
            18 => Self::BlockSetBookmark,
            19 => Self::BlockSetDiv,
            20 => Self::BlockSetBackgroundColor,
            21 => Self::BlockSetAlign,
            22 => Self::BlockSetRelation,
            23 => Self::BlockSetRelations,
            30 => Self::BlockDataviewViewSet,
            31 => Self::BlockDataviewViewDelete,
            32 => Self::BlockDataviewRelationSet,
            33 => Self::BlockDataviewRelationDelete,
            34 => Self::BlockDataviewRecordsSet,
            35 => Self::BlockDataviewRecordsInsert,
            36 => Self::BlockDataviewRecordsUpdate,
            37 => Self::BlockDataviewRecordsDelete,
            40 => Self::ProcessNew,
            41 => Self::ProcessUpdate,
            42 => Self::ProcessDone,
            _ => Self::Unknown,
        }
    }

    pub fn tag(&self) -> u16 {
        match self {
            Self::AccountShow => 1,
            Self::ThreadStatus => 2,
            Self::BlockShow => 3,
            Self::BlockAdd => 10,
            Self::BlockDelete => 11,
            Self::BlockSetChildrenIds => 12,
            Self::BlockSetFields => 13,
            Self::BlockSetDetails => 14,
            Self::BlockSetText => 15,
            Self::BlockSetFile => 16,
            Self::BlockSetLink => 17,
            Self::BlockSetBookmark => 18,
            Self::BlockSetDiv => 19,
            Self::BlockSetBackgroundColor => 20,
            Self::BlockSetAlign => 21,
            Self::BlockSetRelation => 22,
            Self::BlockSetRelations => 23,
            Self::BlockDataviewViewSet => 30,
            Self::BlockDataviewViewDelete => 31,
            Self::BlockDataviewRelationSet => 32,
            Self::BlockDataviewRelationDelete => 33,
            Self::BlockDataviewRecordsSet => 34,
            Self::BlockDataviewRecordsInsert => 35,
            Self::BlockDataviewRecordsUpdate => 36,
            Self::BlockDataviewRecordsDelete => 37,
            Self::ProcessNew => 40,
            Self::ProcessUpdate => 41,
            Self::ProcessDone => 42,
            Self::Unknown => 0,
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::AccountShow => "accountShow",
            Self::ThreadStatus => "threadStatus",
            Self::BlockShow => "blockShow",
            Self::BlockAdd => "blockAdd",
            Self::BlockDelete => "blockDelete",
            Self::BlockSetChildrenIds => "blockSetChildrenIds",
            Self::BlockSetFields => "blockSetFields",
            Self::BlockSetDetails => "blockSetDetails",
            Self::BlockSetText => "blockSetText",
            Self::BlockSetFile => "blockSetFile",
            Self::BlockSetLink => "blockSetLink",
            Self::BlockSetBookmark => "blockSetBookmark",
            Self::BlockSetDiv => "blockSetDiv",
            Self::BlockSetBackgroundColor => "blockSetBackgroundColor",
            Self::BlockSetAlign => "blockSetAlign",
            Self::BlockSetRelation => "blockSetRelation",
            Self::BlockSetRelations => "blockSetRelations",
            Self::BlockDataviewViewSet => "blockDataviewViewSet",
            Self::BlockDataviewViewDelete => "blockDataviewViewDelete",
            Self::BlockDataviewRelationSet => "blockDataviewRelationSet",
            Self::BlockDataviewRelationDelete => "blockDataviewRelationDelete",
            Self::BlockDataviewRecordsSet => "blockDataviewRecordsSet",
            Self::BlockDataviewRecordsInsert => "blockDataviewRecordsInsert",
            Self::BlockDataviewRecordsUpdate => "blockDataviewRecordsUpdate",
            Self::BlockDataviewRecordsDelete => "blockDataviewRecordsDelete",
            Self::ProcessNew => "processNew",
            Self::ProcessUpdate => "processUpdate",
            Self::ProcessDone => "processDone",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// One tagged operation within an event batch. Payload fields that the
/// authority may omit are `Option`al; absent fields leave the target
/// untouched (sparse updates).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    AccountShow(AccountShow),
    ThreadStatus(ThreadStatus),
    BlockShow(BlockShow),
    BlockAdd(BlockAdd),
    BlockDelete(BlockDelete),
    BlockSetChildrenIds(BlockSetChildrenIds),
    BlockSetFields(BlockSetFields),
    BlockSetDetails(BlockSetDetails),
    BlockSetText(BlockSetText),
    BlockSetFile(BlockSetFile),
    BlockSetLink(BlockSetLink),
    BlockSetBookmark(BlockSetBookmark),
    BlockSetDiv(BlockSetDiv),
    BlockSetBackgroundColor(BlockSetBackgroundColor),
    BlockSetAlign(BlockSetAlign),
    BlockSetRelation(BlockSetRelation),
    BlockSetRelations(BlockSetRelations),
    BlockDataviewViewSet(DataviewViewSet),
    BlockDataviewViewDelete(DataviewViewDelete),
    BlockDataviewRelationSet(DataviewRelationSet),
    BlockDataviewRelationDelete(DataviewRelationDelete),
    BlockDataviewRecordsSet(DataviewRecordsSet),
    BlockDataviewRecordsInsert(DataviewRecordsInsert),
    BlockDataviewRecordsUpdate(DataviewRecordsUpdate),
    BlockDataviewRecordsDelete(DataviewRecordsDelete),
    ProcessNew(ProcessMessage),
    ProcessUpdate(ProcessMessage),
    ProcessDone(ProcessMessage),
    Unknown,
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::AccountShow(_) => MessageKind::AccountShow,
            Message::ThreadStatus(_) => MessageKind::ThreadStatus,
            Message::BlockShow(_) => MessageKind::BlockShow,
            Message::BlockAdd(_) => MessageKind::BlockAdd,
            Message::BlockDelete(_) => MessageKind::BlockDelete,
            Message::BlockSetChildrenIds(_) => MessageKind::BlockSetChildrenIds,
            Message::BlockSetFields(_) => MessageKind::BlockSetFields,
            Message::BlockSetDetails(_) => MessageKind::BlockSetDetails,
            Message::BlockSetText(_) => MessageKind::BlockSetText,
            Message::BlockSetFile(_) => MessageKind::BlockSetFile,
            Message::BlockSetLink(_) => MessageKind::BlockSetLink,
            Message::BlockSetBookmark(_) => MessageKind::BlockSetBookmark,
            Message::BlockSetDiv(_) => MessageKind::BlockSetDiv,
            Message::BlockSetBackgroundColor(_) => MessageKind::BlockSetBackgroundColor,
            Message::BlockSetAlign(_) => MessageKind::BlockSetAlign,
            Message::BlockSetRelation(_) => MessageKind::BlockSetRelation,
            Message::BlockSetRelations(_) => MessageKind::BlockSetRelations,
            Message::BlockDataviewViewSet(_) => MessageKind::BlockDataviewViewSet,
            Message::BlockDataviewViewDelete(_) => MessageKind::BlockDataviewViewDelete,
            Message::BlockDataviewRelationSet(_) => MessageKind::BlockDataviewRelationSet,
            Message::BlockDataviewRelationDelete(_) => MessageKind::BlockDataviewRelationDelete,
            Message::BlockDataviewRecordsSet(_) => MessageKind::BlockDataviewRecordsSet,
            Message::BlockDataviewRecordsInsert(_) => MessageKind::BlockDataviewRecordsInsert,
            Message::BlockDataviewRecordsUpdate(_) => MessageKind::BlockDataviewRecordsUpdate,
            Message::BlockDataviewRecordsDelete(_) => MessageKind::BlockDataviewRecordsDelete,
            Message::ProcessNew(_) => MessageKind::ProcessNew,
            Message::ProcessUpdate(_) => MessageKind::ProcessUpdate,
            Message::ProcessDone(_) => MessageKind::ProcessDone,
            Message::Unknown => MessageKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountShow {
    pub account: Account,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadStatus {
    pub summary: ThreadSummary,
    pub cafe: ThreadCafe,
    pub accounts: Vec<ThreadAccount>,
}

/// Full-tree hydration for one context: the relation/type catalog plus a flat
/// block list to be linked and bulk-written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockShow {
    pub blocks: Vec<Block>,
    pub details: Vec<DetailsEntry>,
    pub relations: Vec<Relation>,
    pub object_types: Vec<ObjectType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockAdd {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDelete {
    pub block_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSetChildrenIds {
    pub id: String,
    pub children_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSetFields {
    pub id: String,
    pub fields: Option<Fields>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSetDetails {
    pub id: String,
    pub details: Details,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSetText {
    pub id: String,
    pub text: Option<String>,
    pub marks: Option<Vec<Mark>>,
    pub style: Option<TextStyle>,
    pub checked: Option<bool>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSetFile {
    pub id: String,
    pub name: Option<String>,
    pub hash: Option<String>,
    pub mime: Option<String>,
    pub size: Option<u64>,
    pub kind: Option<FileKind>,
    pub state: Option<FileState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSetLink {
    pub id: String,
    pub fields: Option<Fields>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSetBookmark {
    pub id: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_hash: Option<String>,
    pub favicon_hash: Option<String>,
    pub kind: Option<BookmarkKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSetDiv {
    pub id: String,
    pub style: Option<DivStyle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSetBackgroundColor {
    pub id: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSetAlign {
    pub id: String,
    pub align: Align,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSetRelation {
    pub id: String,
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSetRelations {
    pub id: String,
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataviewViewSet {
    pub id: String,
    pub view: View,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataviewViewDelete {
    pub id: String,
    pub view_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataviewRelationSet {
    pub id: String,
    pub relation: Relation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataviewRelationDelete {
    pub id: String,
    pub relation_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataviewRecordsSet {
    pub id: String,
    pub view_id: String,
    pub records: Vec<Record>,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataviewRecordsInsert {
    pub id: String,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataviewRecordsUpdate {
    pub id: String,
    pub records: Vec<Record>,
}

/// The authority sends the full records to delete; each one is matched by its
/// `id` value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataviewRecordsDelete {
    pub id: String,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessMessage {
    pub process: Process,
}
