//! Error types for device resolution and property access

/// Errors raised while packing or unpacking property payloads.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unsupported property format width {0} (expected 8, 16 or 32)")]
    UnsupportedWidth(u8),

    #[error("malformed property payload: expected {expected} bytes, got {actual}")]
    MalformedPayload { expected: usize, actual: usize },
}

/// Errors coming back from whatever carries property requests to the server.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("the connection broke with the X server: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    #[error("the X server rejected the request: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),

    #[error("no such property on the device")]
    NoSuchProperty,

    #[error("{0}")]
    Rejected(String),

    #[error("the device session is already closed")]
    Closed,
}

/// Errors from named-property get/set.
#[derive(thiserror::Error, Debug)]
pub enum PropertyError {
    #[error("failed to read property \"{name}\": {source}")]
    Read {
        name: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to write property \"{name}\": {source}")]
    Write {
        name: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to get property type and format for \"{0}\"")]
    Missing(String),

    #[error("refusing to write property \"{0}\" without any items")]
    Empty(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Fatal errors while opening a device session.
#[derive(thiserror::Error, Debug)]
pub enum DeviceError {
    #[error("Couldn't connect to the X server: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),

    #[error("The connection broke with the X server: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    #[error("The X server rejected a device request: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),

    #[error("The X server does not support the XInput extension")]
    MissingExtension,

    #[error("Unable to find device \"{0}\"")]
    NotFound(String),

    #[error(
        "There are {count} devices named \"{name}\". \
         To ensure the correct one is selected, please use the device ID instead."
    )]
    Ambiguous { name: String, count: usize },

    #[error("\"{property}\" property missing, not a (valid) evdev device: {source}")]
    Unsupported {
        property: &'static str,
        #[source]
        source: PropertyError,
    },
}
