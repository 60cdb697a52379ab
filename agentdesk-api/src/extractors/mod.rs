//! Request extractors whose rejections use the failure envelope.

mod path_id;
mod validated_json;

pub use path_id::AgentIdPath;
pub use validated_json::ValidatedJson;
