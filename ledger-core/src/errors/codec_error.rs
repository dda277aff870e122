/// Varint delta codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("truncated varint stream: expected continuation or sign byte")]
    Truncated,

    #[error("invalid sign byte {value:#04x}, expected 0x00 or 0x01")]
    BadSignByte { value: u8 },
}
