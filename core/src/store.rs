pub mod memory;

pub use memory::MemoryStore;

use canopy_proto::{Account, Block, DataviewMeta, Details, DetailsEntry, ObjectType, Record, Relation, ThreadInfo};

/// The owner of the synchronized document graph. The pipeline only reads and
/// patches through this seam; it never holds graph state of its own.
///
/// All mutations are infallible by contract: an operation whose target does
/// not exist is a no-op inside the store, mirroring the stale-reference
/// semantics of the event pipeline. Lookups return `Option`/owned copies.
pub trait Store: Send + Sync {
    // ---- blocks -----------------------------------------------------------
    fn get_leaf(&self, context_id: &str, block_id: &str) -> Option<Block>;
    fn block_add(&self, context_id: &str, block: Block);
    fn block_delete(&self, context_id: &str, block_id: &str);
    fn block_update(&self, context_id: &str, block: Block);
    fn block_update_structure(&self, context_id: &str, block_id: &str, children_ids: Vec<String>);
    /// Bulk write for full-tree hydration; replaces the context's blocks.
    fn blocks_set(&self, context_id: &str, blocks: Vec<Block>);

    // ---- details ----------------------------------------------------------
    fn details_set(&self, context_id: &str, entries: Vec<DetailsEntry>);
    fn details_update(&self, context_id: &str, entry: DetailsEntry);
    fn get_details(&self, context_id: &str, id: &str) -> Details;

    // ---- dataview relations ----------------------------------------------
    fn relations_set(&self, context_id: &str, block_id: &str, relations: Vec<Relation>);
    fn relation_add(&self, context_id: &str, block_id: &str, relation: Relation);
    fn relation_update(&self, context_id: &str, block_id: &str, relation: Relation);
    fn relation_remove(&self, context_id: &str, block_id: &str, relation_key: &str);
    fn get_relation(&self, context_id: &str, block_id: &str, relation_key: &str) -> Option<Relation>;
    fn get_relations(&self, context_id: &str, block_id: &str) -> Vec<Relation>;

    // ---- dataview records -------------------------------------------------
    fn records_set(&self, context_id: &str, block_id: &str, records: Vec<Record>);
    fn record_add(&self, context_id: &str, block_id: &str, record: Record);
    fn record_update(&self, context_id: &str, block_id: &str, record: Record);
    fn record_delete(&self, context_id: &str, block_id: &str, record_id: &str);

    // ---- dataview meta ----------------------------------------------------
    fn meta_set(&self, context_id: &str, block_id: &str, meta: DataviewMeta);
    fn get_meta(&self, context_id: &str, block_id: &str) -> DataviewMeta;

    // ---- object types -----------------------------------------------------
    fn object_types_set(&self, object_types: Vec<ObjectType>);
    fn get_object_type(&self, id: &str) -> Option<ObjectType>;

    // ---- derived state ----------------------------------------------------
    /// Recompute numbered-list ordinals for the context in one pass over the
    /// now-consistent tree.
    fn set_numbers(&self, context_id: &str);

    // ---- account / thread status -----------------------------------------
    fn account_add(&self, account: Account);
    fn thread_set(&self, context_id: &str, thread: ThreadInfo);
}
