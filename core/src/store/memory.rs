use std::collections::HashMap;
use std::sync::RwLock;

use canopy_proto::{
    Account, Block, BlockContent, DataviewMeta, Details, DetailsEntry, ObjectType, Record, Relation, TextStyle,
    ThreadInfo, record_id,
};

use crate::store::Store;

/// Reference [`Store`] backed by process memory. Production embeddings supply
/// their own store; this one carries the tests and demos.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    contexts: HashMap<String, ContextState>,
    object_types: HashMap<String, ObjectType>,
    accounts: Vec<Account>,
}

#[derive(Default)]
struct ContextState {
    blocks: HashMap<String, Block>,
    details: HashMap<String, Details>,
    relations: HashMap<String, Vec<Relation>>,
    records: HashMap<String, Vec<Record>>,
    meta: HashMap<String, DataviewMeta>,
    thread: Option<ThreadInfo>,
    /// Ordinals for numbered-list text blocks, recomputed after each batch.
    numbers: HashMap<String, u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_context<R>(&self, context_id: &str, f: impl FnOnce(&mut ContextState) -> R) -> R {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(inner.contexts.entry(context_id.to_string()).or_default())
    }

    fn read_context<R>(&self, context_id: &str, f: impl FnOnce(&ContextState) -> R) -> Option<R> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.contexts.get(context_id).map(f)
    }

    /// The computed ordinal for a numbered text block, if any.
    pub fn number(&self, context_id: &str, block_id: &str) -> Option<u32> {
        self.read_context(context_id, |ctx| ctx.numbers.get(block_id).copied())?
    }

    pub fn block_count(&self, context_id: &str) -> usize {
        self.read_context(context_id, |ctx| ctx.blocks.len()).unwrap_or(0)
    }

    pub fn records(&self, context_id: &str, block_id: &str) -> Vec<Record> {
        self.read_context(context_id, |ctx| ctx.records.get(block_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn thread(&self, context_id: &str) -> Option<ThreadInfo> {
        self.read_context(context_id, |ctx| ctx.thread.clone())?
    }

    pub fn accounts(&self) -> Vec<Account> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.accounts.clone()
    }
}

impl Store for MemoryStore {
    fn get_leaf(&self, context_id: &str, block_id: &str) -> Option<Block> {
        self.read_context(context_id, |ctx| ctx.blocks.get(block_id).cloned())?
    }

    fn block_add(&self, context_id: &str, block: Block) {
        self.with_context(context_id, |ctx| {
            ctx.blocks.insert(block.id.clone(), block);
        });
    }

    fn block_delete(&self, context_id: &str, block_id: &str) {
        self.with_context(context_id, |ctx| {
            ctx.blocks.remove(block_id);
            ctx.numbers.remove(block_id);
        });
    }

    fn block_update(&self, context_id: &str, block: Block) {
        self.with_context(context_id, |ctx| {
            if ctx.blocks.contains_key(&block.id) {
                ctx.blocks.insert(block.id.clone(), block);
            }
        });
    }

    fn block_update_structure(&self, context_id: &str, block_id: &str, children_ids: Vec<String>) {
        self.with_context(context_id, |ctx| {
            for child_id in &children_ids {
                if let Some(child) = ctx.blocks.get_mut(child_id) {
                    child.parent_id = block_id.to_string();
                }
            }
            if let Some(block) = ctx.blocks.get_mut(block_id) {
                block.children_ids = children_ids;
            }
        });
    }

    fn blocks_set(&self, context_id: &str, blocks: Vec<Block>) {
        self.with_context(context_id, |ctx| {
            ctx.blocks.clear();
            ctx.numbers.clear();
            for block in blocks {
                ctx.blocks.insert(block.id.clone(), block);
            }
        });
    }

    fn details_set(&self, context_id: &str, entries: Vec<DetailsEntry>) {
        self.with_context(context_id, |ctx| {
            for entry in entries {
                ctx.details.insert(entry.id, entry.details);
            }
        });
    }

    fn details_update(&self, context_id: &str, entry: DetailsEntry) {
        self.with_context(context_id, |ctx| {
            ctx.details.entry(entry.id).or_default().extend(entry.details);
        });
    }

    fn get_details(&self, context_id: &str, id: &str) -> Details {
        self.read_context(context_id, |ctx| ctx.details.get(id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn relations_set(&self, context_id: &str, block_id: &str, relations: Vec<Relation>) {
        self.with_context(context_id, |ctx| {
            ctx.relations.insert(block_id.to_string(), relations);
        });
    }

    fn relation_add(&self, context_id: &str, block_id: &str, relation: Relation) {
        self.with_context(context_id, |ctx| {
            ctx.relations.entry(block_id.to_string()).or_default().push(relation);
        });
    }

    fn relation_update(&self, context_id: &str, block_id: &str, relation: Relation) {
        self.with_context(context_id, |ctx| {
            if let Some(relations) = ctx.relations.get_mut(block_id) {
                if let Some(existing) = relations.iter_mut().find(|r| r.key == relation.key) {
                    *existing = relation;
                }
            }
        });
    }

    fn relation_remove(&self, context_id: &str, block_id: &str, relation_key: &str) {
        self.with_context(context_id, |ctx| {
            if let Some(relations) = ctx.relations.get_mut(block_id) {
                relations.retain(|r| r.key != relation_key);
            }
        });
    }

    fn get_relation(&self, context_id: &str, block_id: &str, relation_key: &str) -> Option<Relation> {
        self.read_context(context_id, |ctx| {
            ctx.relations.get(block_id).and_then(|rs| rs.iter().find(|r| r.key == relation_key).cloned())
        })?
    }

    fn get_relations(&self, context_id: &str, block_id: &str) -> Vec<Relation> {
        self.read_context(context_id, |ctx| ctx.relations.get(block_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn records_set(&self, context_id: &str, block_id: &str, records: Vec<Record>) {
        self.with_context(context_id, |ctx| {
            ctx.records.insert(block_id.to_string(), records);
        });
    }

    fn record_add(&self, context_id: &str, block_id: &str, record: Record) {
        self.with_context(context_id, |ctx| {
            ctx.records.entry(block_id.to_string()).or_default().push(record);
        });
    }

    fn record_update(&self, context_id: &str, block_id: &str, record: Record) {
        self.with_context(context_id, |ctx| {
            let Some(id) = record_id(&record).map(str::to_string) else { return };
            if let Some(records) = ctx.records.get_mut(block_id) {
                if let Some(existing) = records.iter_mut().find(|r| record_id(r) == Some(id.as_str())) {
                    *existing = record;
                }
            }
        });
    }

    fn record_delete(&self, context_id: &str, block_id: &str, record_id_value: &str) {
        self.with_context(context_id, |ctx| {
            if let Some(records) = ctx.records.get_mut(block_id) {
                records.retain(|r| record_id(r) != Some(record_id_value));
            }
        });
    }

    fn meta_set(&self, context_id: &str, block_id: &str, meta: DataviewMeta) {
        self.with_context(context_id, |ctx| {
            ctx.meta.insert(block_id.to_string(), meta);
        });
    }

    fn get_meta(&self, context_id: &str, block_id: &str) -> DataviewMeta {
        self.read_context(context_id, |ctx| ctx.meta.get(block_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn object_types_set(&self, object_types: Vec<ObjectType>) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        for object_type in object_types {
            inner.object_types.insert(object_type.id.clone(), object_type);
        }
    }

    fn get_object_type(&self, id: &str) -> Option<ObjectType> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.object_types.get(id).cloned()
    }

    fn set_numbers(&self, context_id: &str) {
        self.with_context(context_id, |ctx| {
            ctx.numbers.clear();
            number_children(ctx, context_id);
        });
    }

    fn account_add(&self, account: Account) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = inner.accounts.iter_mut().find(|a| a.id == account.id) {
            *existing = account;
        } else {
            inner.accounts.push(account);
        }
    }

    fn thread_set(&self, context_id: &str, thread: ThreadInfo) {
        self.with_context(context_id, |ctx| {
            ctx.thread = Some(thread);
        });
    }
}

/// Walk the tree below `block_id`, numbering each consecutive run of numbered
/// text siblings from 1.
fn number_children(ctx: &mut ContextState, block_id: &str) {
    let children_ids = match ctx.blocks.get(block_id) {
        Some(block) => block.children_ids.clone(),
        None => return,
    };
    let mut ordinal = 0u32;
    for child_id in &children_ids {
        let is_numbered = ctx
            .blocks
            .get(child_id)
            .map(|b| matches!(&b.content, BlockContent::Text(t) if t.style == TextStyle::Numbered))
            .unwrap_or(false);
        if is_numbered {
            ordinal += 1;
            ctx.numbers.insert(child_id.clone(), ordinal);
        } else {
            ordinal = 0;
        }
        number_children(ctx, child_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_proto::{Block, BlockContent, PageContent, TextContent, TextStyle};

    fn text_block(id: &str, style: TextStyle) -> Block {
        Block::new(
            id,
            BlockContent::Text(TextContent { style, ..Default::default() }),
        )
    }

    #[test]
    fn update_missing_block_is_a_no_op() {
        let store = MemoryStore::new();
        store.block_update("ctx", text_block("ghost", TextStyle::Paragraph));
        assert!(store.get_leaf("ctx", "ghost").is_none());
    }

    #[test]
    fn structure_update_sets_parent_links() {
        let store = MemoryStore::new();
        store.block_add("ctx", Block::new("root", BlockContent::Page(PageContent::default())));
        store.block_add("ctx", text_block("a", TextStyle::Paragraph));
        store.block_update_structure("ctx", "root", vec!["a".into()]);
        assert_eq!(store.get_leaf("ctx", "a").map(|b| b.parent_id), Some("root".into()));
        assert_eq!(store.get_leaf("ctx", "root").map(|b| b.children_ids), Some(vec!["a".to_string()]));
    }

    #[test]
    fn set_numbers_restarts_after_interruption() {
        let store = MemoryStore::new();
        let mut root = Block::new("ctx", BlockContent::Page(PageContent::default()));
        root.children_ids = vec!["n1".into(), "n2".into(), "p".into(), "n3".into()];
        store.block_add("ctx", root);
        store.block_add("ctx", text_block("n1", TextStyle::Numbered));
        store.block_add("ctx", text_block("n2", TextStyle::Numbered));
        store.block_add("ctx", text_block("p", TextStyle::Paragraph));
        store.block_add("ctx", text_block("n3", TextStyle::Numbered));
        store.set_numbers("ctx");
        assert_eq!(store.number("ctx", "n1"), Some(1));
        assert_eq!(store.number("ctx", "n2"), Some(2));
        assert_eq!(store.number("ctx", "n3"), Some(1));
        assert_eq!(store.number("ctx", "p"), None);
    }

    #[test]
    fn record_delete_matches_by_id_value() {
        let store = MemoryStore::new();
        let mut rec = Record::new();
        rec.insert("id".into(), "r1".into());
        rec.insert("name".into(), "first".into());
        store.records_set("ctx", "dv", vec![rec]);
        store.record_delete("ctx", "dv", "r1");
        assert!(store.records("ctx", "dv").is_empty());
    }
}
