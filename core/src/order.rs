use canopy_proto::{Message, MessageKind};

/// Reorder a batch so structural and additive operations run before the
/// content operations that depend on them: blockAdd first, then blockDelete,
/// then blockSetChildrenIds, then everything else. The sort is stable, so
/// messages within the same class keep their original relative order.
pub fn order_batch(messages: &mut [Message]) {
    messages.sort_by_key(|message| rank(message.kind()));
}

fn rank(kind: MessageKind) -> u8 {
    match kind {
        MessageKind::BlockAdd => 0,
        MessageKind::BlockDelete => 1,
        MessageKind::BlockSetChildrenIds => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_proto::{
        Block, BlockAdd, BlockContent, BlockDelete, BlockSetBackgroundColor, BlockSetChildrenIds, BlockSetText,
        TextContent,
    };

    fn add(id: &str) -> Message {
        Message::BlockAdd(BlockAdd { blocks: vec![Block::new(id, BlockContent::Text(TextContent::default()))] })
    }

    fn delete(id: &str) -> Message { Message::BlockDelete(BlockDelete { block_ids: vec![id.to_string()] }) }

    fn children(id: &str) -> Message {
        Message::BlockSetChildrenIds(BlockSetChildrenIds { id: id.to_string(), children_ids: vec![] })
    }

    fn set_text(id: &str) -> Message {
        Message::BlockSetText(BlockSetText {
            id: id.to_string(),
            text: None,
            marks: None,
            style: None,
            checked: None,
            color: None,
        })
    }

    fn kinds(messages: &[Message]) -> Vec<MessageKind> { messages.iter().map(Message::kind).collect() }

    #[test]
    fn priority_classes_form_contiguous_runs() {
        let mut messages = vec![
            set_text("a"),
            children("p"),
            add("x"),
            delete("d"),
            Message::BlockSetBackgroundColor(BlockSetBackgroundColor { id: "a".into(), color: "red".into() }),
            add("y"),
            delete("e"),
            children("q"),
        ];

        order_batch(&mut messages);

        assert_eq!(
            kinds(&messages),
            vec![
                MessageKind::BlockAdd,
                MessageKind::BlockAdd,
                MessageKind::BlockDelete,
                MessageKind::BlockDelete,
                MessageKind::BlockSetChildrenIds,
                MessageKind::BlockSetChildrenIds,
                MessageKind::BlockSetText,
                MessageKind::BlockSetBackgroundColor,
            ]
        );
    }

    #[test]
    fn ties_preserve_original_relative_order() {
        let mut messages = vec![add("x"), add("y"), set_text("a"), set_text("b")];
        order_batch(&mut messages);

        // Stable: x before y, a before b.
        let Message::BlockAdd(first) = &messages[0] else { panic!("expected blockAdd") };
        let Message::BlockAdd(second) = &messages[1] else { panic!("expected blockAdd") };
        assert_eq!(first.blocks[0].id, "x");
        assert_eq!(second.blocks[0].id, "y");

        let Message::BlockSetText(third) = &messages[2] else { panic!("expected blockSetText") };
        let Message::BlockSetText(fourth) = &messages[3] else { panic!("expected blockSetText") };
        assert_eq!(third.id, "a");
        assert_eq!(fourth.id, "b");
    }

    #[test]
    fn unrelated_kinds_do_not_move() {
        let mut messages = vec![set_text("a"), Message::Unknown, set_text("b")];
        order_batch(&mut messages);

        assert_eq!(kinds(&messages), vec![MessageKind::BlockSetText, MessageKind::Unknown, MessageKind::BlockSetText]);
        let Message::BlockSetText(first) = &messages[0] else { panic!() };
        assert_eq!(first.id, "a");
    }
}
