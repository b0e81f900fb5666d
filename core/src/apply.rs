//! Applies an ordered event batch to the store, one idempotent handler per
//! message kind. A handler whose target block no longer exists silently
//! drops the message; an `Option`al payload field that is absent leaves the
//! corresponding store field untouched.

use canopy_proto::*;

use crate::collab::ProgressSink;
use crate::store::Store;
use crate::structure::StructuralIndex;

/// Column width given to relations a view has no projection for yet.
const DEFAULT_VIEW_RELATION_WIDTH: u32 = 192;

pub struct Applier<'a> {
    store: &'a dyn Store,
    progress: &'a dyn ProgressSink,
}

impl<'a> Applier<'a> {
    pub fn new(store: &'a dyn Store, progress: &'a dyn ProgressSink) -> Self {
        Self { store, progress }
    }

    /// Apply every message of one batch, then refresh derived list numbering
    /// over the now-consistent tree.
    pub fn apply_batch(&self, context_id: &str, messages: &[Message], index: &StructuralIndex) {
        for message in messages {
            self.apply(context_id, message, index);
        }
        self.store.set_numbers(context_id);
    }

    fn apply(&self, context_id: &str, message: &Message, index: &StructuralIndex) {
        match message {
            Message::AccountShow(msg) => self.store.account_add(msg.account.clone()),
            Message::ThreadStatus(msg) => self.thread_status(context_id, msg),
            Message::BlockShow(msg) => self.block_show(context_id, msg),
            Message::BlockAdd(msg) => self.block_add(context_id, msg, index),
            Message::BlockDelete(msg) => self.block_delete(context_id, msg),
            Message::BlockSetChildrenIds(msg) => self.set_children_ids(context_id, msg),
            Message::BlockSetFields(msg) => self.set_fields(context_id, msg),
            Message::BlockSetDetails(msg) => self.set_details(context_id, msg),
            Message::BlockSetText(msg) => self.set_text(context_id, msg),
            Message::BlockSetFile(msg) => self.set_file(context_id, msg),
            Message::BlockSetLink(msg) => self.set_link(context_id, msg),
            Message::BlockSetBookmark(msg) => self.set_bookmark(context_id, msg),
            Message::BlockSetDiv(msg) => self.set_div(context_id, msg),
            Message::BlockSetBackgroundColor(msg) => self.set_background_color(context_id, msg),
            Message::BlockSetAlign(msg) => self.set_align(context_id, msg),
            Message::BlockSetRelation(msg) => self.set_relation_key(context_id, msg),
            Message::BlockSetRelations(msg) => self.set_relations(context_id, msg),
            Message::BlockDataviewViewSet(msg) => self.dataview_view_set(context_id, msg),
            Message::BlockDataviewViewDelete(msg) => self.dataview_view_delete(context_id, msg),
            Message::BlockDataviewRelationSet(msg) => self.dataview_relation_set(context_id, msg),
            Message::BlockDataviewRelationDelete(msg) => self.dataview_relation_delete(context_id, msg),
            Message::BlockDataviewRecordsSet(msg) => self.dataview_records_set(context_id, msg),
            Message::BlockDataviewRecordsInsert(msg) => self.dataview_records_insert(context_id, msg),
            Message::BlockDataviewRecordsUpdate(msg) => self.dataview_records_update(context_id, msg),
            Message::BlockDataviewRecordsDelete(msg) => self.dataview_records_delete(context_id, msg),
            Message::ProcessNew(msg) | Message::ProcessUpdate(msg) | Message::ProcessDone(msg) => {
                self.process(msg)
            }
            Message::Unknown => tracing::trace!("skipping unrecognized message"),
        }
    }

    fn thread_status(&self, context_id: &str, msg: &ThreadStatus) {
        self.store.thread_set(
            context_id,
            ThreadInfo {
                summary: msg.summary.clone(),
                cafe: msg.cafe.clone(),
                accounts: msg.accounts.clone(),
            },
        );
    }

    /// Full-tree hydration: catalogs first, then a single bulk block write
    /// with parent links recovered and the root rewritten as a page of the
    /// resolved layout.
    fn block_show(&self, context_id: &str, msg: &BlockShow) {
        self.store.relations_set(context_id, context_id, msg.relations.clone());
        self.store.object_types_set(msg.object_types.clone());
        self.store.details_set(context_id, msg.details.clone());

        let layout = self.resolve_layout(context_id);

        let mut parents: std::collections::HashMap<&str, &str> = Default::default();
        for block in &msg.blocks {
            for child_id in &block.children_ids {
                parents.insert(child_id, &block.id);
            }
        }

        let mut blocks = Vec::with_capacity(msg.blocks.len());
        for block in &msg.blocks {
            let mut block = block.clone();
            block.parent_id = parents.get(block.id.as_str()).map(|p| p.to_string()).unwrap_or_default();
            if block.id == context_id {
                block.content = BlockContent::Page(PageContent { layout });
            } else if let BlockContent::Dataview(dv) = &mut block.content {
                self.store.relations_set(context_id, &block.id, dv.relations.clone());
                for view in &mut dv.views {
                    view.relations = self.view_relations(context_id, &block.id, view);
                }
            }
            blocks.push(block);
        }
        self.store.blocks_set(context_id, blocks);
    }

    /// Layout precedence: an explicit layout code in the root details, then
    /// the object type's layout, then the default page layout.
    fn resolve_layout(&self, context_id: &str) -> ObjectLayout {
        let details = self.store.get_details(context_id, context_id);
        if let Some(layout) = details
            .get("layout")
            .and_then(Value::as_number)
            .and_then(|code| ObjectLayout::from_code(code as u32))
        {
            return layout;
        }
        details
            .get("type")
            .and_then(Value::as_text)
            .and_then(|type_id| self.store.get_object_type(type_id))
            .map(|object_type| object_type.layout)
            .unwrap_or_default()
    }

    fn block_add(&self, context_id: &str, msg: &BlockAdd, index: &StructuralIndex) {
        for block in &msg.blocks {
            let mut block = block.clone();
            block.parent_id = index.parent_of(&block.id).unwrap_or_default().to_string();
            self.store.block_add(context_id, block);
        }
    }

    fn block_delete(&self, context_id: &str, msg: &BlockDelete) {
        for block_id in &msg.block_ids {
            self.store.block_delete(context_id, block_id);
        }
    }

    fn set_children_ids(&self, context_id: &str, msg: &BlockSetChildrenIds) {
        if self.store.get_leaf(context_id, &msg.id).is_none() {
            return;
        }
        self.store.block_update_structure(context_id, &msg.id, msg.children_ids.clone());
    }

    fn set_fields(&self, context_id: &str, msg: &BlockSetFields) {
        let Some(mut block) = self.store.get_leaf(context_id, &msg.id) else { return };
        if let Some(fields) = &msg.fields {
            block.fields = fields.clone();
        }
        self.store.block_update(context_id, block);
    }

    fn set_details(&self, context_id: &str, msg: &BlockSetDetails) {
        // Details target objects, not blocks; no leaf guard.
        self.store.details_update(
            context_id,
            DetailsEntry { id: msg.id.clone(), details: msg.details.clone() },
        );
    }

    fn set_text(&self, context_id: &str, msg: &BlockSetText) {
        let Some(mut block) = self.store.get_leaf(context_id, &msg.id) else { return };
        let BlockContent::Text(text) = &mut block.content else { return };
        if let Some(value) = &msg.text {
            text.text = value.clone();
        }
        if let Some(marks) = &msg.marks {
            text.marks = marks.clone();
        }
        if let Some(style) = msg.style {
            text.style = style;
        }
        if let Some(checked) = msg.checked {
            text.checked = checked;
        }
        if let Some(color) = &msg.color {
            text.color = color.clone();
        }
        self.store.block_update(context_id, block);
    }

    fn set_file(&self, context_id: &str, msg: &BlockSetFile) {
        let Some(mut block) = self.store.get_leaf(context_id, &msg.id) else { return };
        let BlockContent::File(file) = &mut block.content else { return };
        if let Some(name) = &msg.name {
            file.name = name.clone();
        }
        if let Some(hash) = &msg.hash {
            file.hash = hash.clone();
        }
        if let Some(mime) = &msg.mime {
            file.mime = mime.clone();
        }
        if let Some(size) = msg.size {
            file.size = size;
        }
        if let Some(kind) = msg.kind {
            file.kind = kind;
        }
        if let Some(state) = msg.state {
            file.state = state;
        }
        self.store.block_update(context_id, block);
    }

    fn set_link(&self, context_id: &str, msg: &BlockSetLink) {
        let Some(mut block) = self.store.get_leaf(context_id, &msg.id) else { return };
        let BlockContent::Link(link) = &mut block.content else { return };
        if let Some(fields) = &msg.fields {
            link.fields = fields.clone();
        }
        self.store.block_update(context_id, block);
    }

    fn set_bookmark(&self, context_id: &str, msg: &BlockSetBookmark) {
        let Some(mut block) = self.store.get_leaf(context_id, &msg.id) else { return };
        let BlockContent::Bookmark(bookmark) = &mut block.content else { return };
        if let Some(url) = &msg.url {
            bookmark.url = url.clone();
        }
        if let Some(title) = &msg.title {
            bookmark.title = title.clone();
        }
        if let Some(description) = &msg.description {
            bookmark.description = description.clone();
        }
        if let Some(image_hash) = &msg.image_hash {
            bookmark.image_hash = image_hash.clone();
        }
        if let Some(favicon_hash) = &msg.favicon_hash {
            bookmark.favicon_hash = favicon_hash.clone();
        }
        if let Some(kind) = msg.kind {
            bookmark.kind = kind;
        }
        self.store.block_update(context_id, block);
    }

    fn set_div(&self, context_id: &str, msg: &BlockSetDiv) {
        let Some(mut block) = self.store.get_leaf(context_id, &msg.id) else { return };
        let BlockContent::Div(div) = &mut block.content else { return };
        if let Some(style) = msg.style {
            div.style = style;
        }
        self.store.block_update(context_id, block);
    }

    fn set_background_color(&self, context_id: &str, msg: &BlockSetBackgroundColor) {
        let Some(mut block) = self.store.get_leaf(context_id, &msg.id) else { return };
        block.background_color = msg.color.clone();
        self.store.block_update(context_id, block);
    }

    fn set_align(&self, context_id: &str, msg: &BlockSetAlign) {
        let Some(mut block) = self.store.get_leaf(context_id, &msg.id) else { return };
        block.align = msg.align;
        self.store.block_update(context_id, block);
    }

    fn set_relation_key(&self, context_id: &str, msg: &BlockSetRelation) {
        let Some(mut block) = self.store.get_leaf(context_id, &msg.id) else { return };
        let BlockContent::Relation(relation) = &mut block.content else { return };
        if let Some(key) = &msg.key {
            relation.key = key.clone();
        }
        self.store.block_update(context_id, block);
    }

    fn set_relations(&self, context_id: &str, msg: &BlockSetRelations) {
        if self.store.get_leaf(context_id, &msg.id).is_none() {
            return;
        }
        // The relation catalog lives on the context object itself.
        self.store.relations_set(context_id, context_id, msg.relations.clone());
    }

    fn dataview_view_set(&self, context_id: &str, msg: &DataviewViewSet) {
        let Some(mut block) = self.store.get_leaf(context_id, &msg.id) else { return };
        let BlockContent::Dataview(dv) = &mut block.content else { return };
        match dv.views.iter().position(|v| v.id == msg.view.id) {
            Some(i) => {
                let mut view = msg.view.clone();
                view.relations = self.view_relations(context_id, &msg.id, &view);
                dv.views[i] = view;
            }
            None => dv.views.push(msg.view.clone()),
        }
        self.store.block_update(context_id, block);
    }

    fn dataview_view_delete(&self, context_id: &str, msg: &DataviewViewDelete) {
        let Some(mut block) = self.store.get_leaf(context_id, &msg.id) else { return };
        let BlockContent::Dataview(dv) = &mut block.content else { return };
        dv.views.retain(|v| v.id != msg.view_id);
        // If the active view went away, fall back to the last one standing.
        let next_view_id = dv.views.last().map(|v| v.id.clone()).unwrap_or_default();
        self.store.block_update(context_id, block);

        let meta = self.store.get_meta(context_id, &msg.id);
        if meta.view_id == msg.view_id {
            self.store.meta_set(context_id, &msg.id, DataviewMeta { view_id: next_view_id, total: meta.total });
        }
    }

    fn dataview_relation_set(&self, context_id: &str, msg: &DataviewRelationSet) {
        if self.store.get_leaf(context_id, &msg.id).is_none() {
            return;
        }
        if self.store.get_relation(context_id, &msg.id, &msg.relation.key).is_some() {
            self.store.relation_update(context_id, &msg.id, msg.relation.clone());
        } else {
            self.store.relation_add(context_id, &msg.id, msg.relation.clone());
        }
    }

    fn dataview_relation_delete(&self, context_id: &str, msg: &DataviewRelationDelete) {
        if self.store.get_leaf(context_id, &msg.id).is_none() {
            return;
        }
        self.store.relation_remove(context_id, &msg.id, &msg.relation_key);
    }

    fn dataview_records_set(&self, context_id: &str, msg: &DataviewRecordsSet) {
        if self.store.get_leaf(context_id, &msg.id).is_none() {
            return;
        }
        self.store.records_set(context_id, &msg.id, msg.records.clone());
        self.store.meta_set(
            context_id,
            &msg.id,
            DataviewMeta { view_id: msg.view_id.clone(), total: msg.total },
        );
    }

    fn dataview_records_insert(&self, context_id: &str, msg: &DataviewRecordsInsert) {
        if self.store.get_leaf(context_id, &msg.id).is_none() {
            return;
        }
        for record in &msg.records {
            self.store.record_add(context_id, &msg.id, record.clone());
        }
    }

    fn dataview_records_update(&self, context_id: &str, msg: &DataviewRecordsUpdate) {
        if self.store.get_leaf(context_id, &msg.id).is_none() {
            return;
        }
        for record in &msg.records {
            self.store.record_update(context_id, &msg.id, record.clone());
        }
    }

    fn dataview_records_delete(&self, context_id: &str, msg: &DataviewRecordsDelete) {
        if self.store.get_leaf(context_id, &msg.id).is_none() {
            return;
        }
        for record in &msg.records {
            if let Some(id) = record_id(record) {
                self.store.record_delete(context_id, &msg.id, id);
            }
        }
    }

    fn process(&self, msg: &ProcessMessage) {
        let process = &msg.process;
        match process.state {
            ProcessState::Running | ProcessState::Done => self.progress.progress_set(ProgressUpdate {
                id: process.id.clone(),
                status: status_label(process.kind).to_string(),
                current: process.progress.done,
                total: process.progress.total,
                // Imports lock the UI until they finish.
                is_unlocked: process.kind != ProcessKind::Import,
                can_cancel: true,
            }),
            ProcessState::Canceled => self.progress.progress_clear(),
            ProcessState::None | ProcessState::Error => {}
        }
    }

    /// Project the block's relation catalog through the view's per-relation
    /// settings, appending defaults for relations the view has never seen.
    fn view_relations(&self, context_id: &str, block_id: &str, view: &View) -> Vec<ViewRelation> {
        self.store
            .get_relations(context_id, block_id)
            .into_iter()
            .map(|relation| {
                view.relations
                    .iter()
                    .find(|vr| vr.key == relation.key)
                    .cloned()
                    .unwrap_or(ViewRelation {
                        key: relation.key,
                        visible: false,
                        width: DEFAULT_VIEW_RELATION_WIDTH,
                    })
            })
            .collect()
    }
}

/// Indicator label keyed by what the process is doing, not how far along
/// it is.
fn status_label(kind: ProcessKind) -> &'static str {
    match kind {
        ProcessKind::DropFiles => "dropFiles",
        ProcessKind::Import => "import",
        ProcessKind::Export => "export",
        ProcessKind::SaveFile => "saveFile",
        ProcessKind::RecoverAccount => "recoverAccount",
    }
}
