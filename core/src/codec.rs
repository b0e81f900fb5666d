//! Per-kind encoding of command payloads and decoding of response payloads.
//! The wire carries raw bytes; only this module and the kind know the shape.

use canopy_proto::{
    BlockCreateResponse, CommandKind, CommandPayload, ObjectOpenResponse, ObjectSearchResponse, ResponsePayload,
};

pub fn encode_request(payload: &CommandPayload) -> Result<Vec<u8>, bincode::Error> {
    match payload {
        CommandPayload::ObjectOpen(req) => bincode::serialize(req),
        CommandPayload::ObjectClose(req) => bincode::serialize(req),
        CommandPayload::ObjectSearch(req) => bincode::serialize(req),
        CommandPayload::BlockCreate(req) => bincode::serialize(req),
        CommandPayload::BlockSetText(req) => bincode::serialize(req),
        CommandPayload::BlockListDelete(req) => bincode::serialize(req),
        CommandPayload::ProcessCancel(req) => bincode::serialize(req),
    }
}

pub fn decode_request(kind: CommandKind, bytes: &[u8]) -> Result<CommandPayload, bincode::Error> {
    Ok(match kind {
        CommandKind::ObjectOpen => CommandPayload::ObjectOpen(bincode::deserialize(bytes)?),
        CommandKind::ObjectClose => CommandPayload::ObjectClose(bincode::deserialize(bytes)?),
        CommandKind::ObjectSearch => CommandPayload::ObjectSearch(bincode::deserialize(bytes)?),
        CommandKind::BlockCreate => CommandPayload::BlockCreate(bincode::deserialize(bytes)?),
        CommandKind::BlockSetText => CommandPayload::BlockSetText(bincode::deserialize(bytes)?),
        CommandKind::BlockListDelete => CommandPayload::BlockListDelete(bincode::deserialize(bytes)?),
        CommandKind::ProcessCancel => CommandPayload::ProcessCancel(bincode::deserialize(bytes)?),
    })
}

/// Decode the kind-specific response payload. Kinds without a response shape
/// decode to `None` regardless of the bytes.
pub fn decode_response(kind: CommandKind, bytes: &[u8]) -> Result<Option<ResponsePayload>, bincode::Error> {
    Ok(match kind {
        CommandKind::ObjectOpen => {
            let res: ObjectOpenResponse = bincode::deserialize(bytes)?;
            Some(ResponsePayload::ObjectOpen(res))
        }
        CommandKind::ObjectSearch => {
            let res: ObjectSearchResponse = bincode::deserialize(bytes)?;
            Some(ResponsePayload::ObjectSearch(res))
        }
        CommandKind::BlockCreate => {
            let res: BlockCreateResponse = bincode::deserialize(bytes)?;
            Some(ResponsePayload::BlockCreate(res))
        }
        CommandKind::ObjectClose | CommandKind::BlockSetText | CommandKind::BlockListDelete | CommandKind::ProcessCancel => None,
    })
}

pub fn encode_response(payload: &ResponsePayload) -> Result<Vec<u8>, bincode::Error> {
    match payload {
        ResponsePayload::ObjectOpen(res) => bincode::serialize(res),
        ResponsePayload::ObjectSearch(res) => bincode::serialize(res),
        ResponsePayload::BlockCreate(res) => bincode::serialize(res),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_proto::ObjectOpenRequest;

    #[test]
    fn request_round_trip() {
        let payload = CommandPayload::ObjectOpen(ObjectOpenRequest { object_id: "obj-1".into() });
        let bytes = encode_request(&payload).unwrap();
        let decoded = decode_request(CommandKind::ObjectOpen, &bytes).unwrap();
        let CommandPayload::ObjectOpen(req) = decoded else { panic!("wrong kind") };
        assert_eq!(req.object_id, "obj-1");
    }

    #[test]
    fn payloadless_kind_decodes_to_none() {
        assert!(decode_response(CommandKind::ObjectClose, b"whatever").unwrap().is_none());
    }

    #[test]
    fn response_decode_rejects_garbage() {
        assert!(decode_response(CommandKind::ObjectOpen, &[0xff, 0xff, 0xff]).is_err());
    }
}
