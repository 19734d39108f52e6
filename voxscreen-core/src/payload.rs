/// Container/codec tag for finalized recordings: WAV mono 16-bit PCM.
pub const WAV_MIME: &str = "audio/wav";

/// Immutable result of a completed capture session: raw container bytes
/// plus the MIME tag the analysis boundary needs for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioPayload {
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: WAV_MIME.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
