use serde::Serialize;

/// A public REST endpoint: its path under the API base URL plus request and
/// response types.
pub trait Method {
    const PATH: &'static str;

    type Response: serde::de::DeserializeOwned;
    type Params: Serialize;
}
