//! Wire messages exchanged over the framed connection.
//!
//! The schema follows the voiceproxy/basic protobuf definitions the server
//! speaks. The messages are small and fixed, so they are declared with prost
//! derives directly instead of a protoc build step.

/// Response code the server uses for "accepted".
pub const RESPONSE_OK: i32 = 200;

/// Session descriptor, sent exactly once after the connection upgrade and
/// before any audio frame.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConnectionRequest {
    #[prost(int32, optional, tag = "1")]
    pub protocol_version: ::core::option::Option<i32>,
    #[prost(string, tag = "2")]
    pub speechkit_version: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub service_name: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub uuid: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub api_key: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub application_name: ::prost::alloc::string::String,
    #[prost(string, tag = "7")]
    pub device: ::prost::alloc::string::String,
    #[prost(string, tag = "8")]
    pub coords: ::prost::alloc::string::String,
    #[prost(string, tag = "9")]
    pub topic: ::prost::alloc::string::String,
    #[prost(string, tag = "10")]
    pub lang: ::prost::alloc::string::String,
    #[prost(string, tag = "11")]
    pub format: ::prost::alloc::string::String,
}

/// Session acknowledgement, received exactly once in reply to
/// [`ConnectionRequest`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConnectionResponse {
    #[prost(int32, tag = "1")]
    pub response_code: i32,
    #[prost(string, tag = "2")]
    pub session_id: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "3")]
    pub message: ::core::option::Option<::prost::alloc::string::String>,
}

/// One outbound audio chunk. Exactly one message in the stream carries
/// `last_chunk = true`; it is always the last one sent and its payload is
/// empty.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AddData {
    #[prost(bytes = "vec", tag = "1")]
    pub audio_data: ::prost::alloc::vec::Vec<u8>,
    #[prost(bool, tag = "2")]
    pub last_chunk: bool,
}

/// One inbound recognition update. `messages_count` is a delta contribution
/// toward the expected total, not an absolute sequence number; the original
/// schema defaults it to 1 when absent.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AddDataResponse {
    #[prost(int32, tag = "1")]
    pub response_code: i32,
    #[prost(message, repeated, tag = "2")]
    pub recognition: ::prost::alloc::vec::Vec<Recognition>,
    #[prost(bool, tag = "3")]
    pub end_of_utt: bool,
    #[prost(int32, optional, tag = "4")]
    pub messages_count: ::core::option::Option<i32>,
}

/// One recognition candidate.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Recognition {
    #[prost(float, tag = "1")]
    pub confidence: f32,
    #[prost(message, repeated, tag = "2")]
    pub words: ::prost::alloc::vec::Vec<Word>,
    #[prost(string, tag = "3")]
    pub normalized: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Word {
    #[prost(float, tag = "1")]
    pub confidence: f32,
    #[prost(string, tag = "2")]
    pub value: ::prost::alloc::string::String,
}

impl AddDataResponse {
    /// Delta contribution of this update, clamped to be non-negative.
    pub fn delta(&self) -> u64 {
        self.messages_count.unwrap_or(1).max(0) as u64
    }
}
