use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Opaque payment packet carried alongside a transfer or message.
///
/// The plugin never interprets the packet; it is routed byte-for-byte.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentPacket(Bytes);

impl PaymentPacket {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self(data.into())
    }

    pub fn empty() -> Self {
        Self(Bytes::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Named auxiliary payload riding on a transfer or message.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubprotocolData {
    /// Name of the protocol this data belongs to.
    pub protocol_name: String,
    /// MIME content type of `data`.
    pub content_type: String,
    pub data: Bytes,
}

impl SubprotocolData {
    pub fn new(
        protocol_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            protocol_name: protocol_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }
}
