use std::collections::HashMap;

use canopy_proto::Message;

/// Per-batch parent/child linkage, computed in one scan before any mutation
/// handler runs. A blockAdd's parent is often declared by a separate
/// blockSetChildrenIds message elsewhere in the same batch, so the index must
/// be complete before the first handler executes.
#[derive(Debug, Default)]
pub struct StructuralIndex {
    parents: HashMap<String, String>,
    children: HashMap<String, Vec<String>>,
}

impl StructuralIndex {
    pub fn build(messages: &[Message]) -> Self {
        let mut index = Self::default();
        for message in messages {
            match message {
                Message::BlockSetChildrenIds(data) => {
                    index.link(&data.id, &data.children_ids);
                }
                Message::BlockAdd(data) => {
                    for block in &data.blocks {
                        index.link(&block.id, &block.children_ids);
                    }
                }
                _ => {}
            }
        }
        index
    }

    fn link(&mut self, parent: &str, children: &[String]) {
        for child in children {
            self.parents.insert(child.clone(), parent.to_string());
        }
        if !children.is_empty() {
            self.children.insert(parent.to_string(), children.to_vec());
        }
    }

    pub fn parent_of(&self, child_id: &str) -> Option<&str> { self.parents.get(child_id).map(String::as_str) }

    pub fn children_of(&self, parent_id: &str) -> Option<&[String]> { self.children.get(parent_id).map(Vec::as_slice) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_proto::{Block, BlockAdd, BlockContent, BlockSetChildrenIds, TextContent};

    fn text_block(id: &str, children: &[&str]) -> Block {
        let mut block = Block::new(id, BlockContent::Text(TextContent::default()));
        block.children_ids = children.iter().map(|s| s.to_string()).collect();
        block
    }

    #[test]
    fn children_ids_message_links_parent() {
        let messages = vec![Message::BlockSetChildrenIds(BlockSetChildrenIds {
            id: "p".into(),
            children_ids: vec!["c1".into(), "c2".into()],
        })];

        let index = StructuralIndex::build(&messages);
        assert_eq!(index.parent_of("c1"), Some("p"));
        assert_eq!(index.parent_of("c2"), Some("p"));
        assert_eq!(index.children_of("p"), Some(&["c1".to_string(), "c2".to_string()][..]));
    }

    #[test]
    fn block_add_links_declared_children() {
        let messages = vec![Message::BlockAdd(BlockAdd { blocks: vec![text_block("a", &["b"])] })];

        let index = StructuralIndex::build(&messages);
        assert_eq!(index.parent_of("b"), Some("a"));
        assert_eq!(index.parent_of("a"), None);
    }

    #[test]
    fn linkage_is_order_independent() {
        // The children declaration arrives after the add; the index still
        // resolves the parent because it scans the whole batch first.
        let messages = vec![
            Message::BlockAdd(BlockAdd { blocks: vec![text_block("c1", &[])] }),
            Message::BlockSetChildrenIds(BlockSetChildrenIds { id: "p".into(), children_ids: vec!["c1".into()] }),
        ];

        let index = StructuralIndex::build(&messages);
        assert_eq!(index.parent_of("c1"), Some("p"));
    }

    #[test]
    fn empty_children_list_links_nothing() {
        let messages =
            vec![Message::BlockSetChildrenIds(BlockSetChildrenIds { id: "p".into(), children_ids: vec![] })];

        let index = StructuralIndex::build(&messages);
        assert_eq!(index.children_of("p"), None);
    }
}
