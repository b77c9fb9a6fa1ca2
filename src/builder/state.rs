use secrecy::SecretString;

use super::backend::EndpointTable;

#[derive(Default)]
pub(crate) struct BuilderState {
    pub(crate) provider: Option<String>,
    pub(crate) base_url: Option<String>,
    pub(crate) api_key: Option<SecretString>,
    pub(crate) endpoints: Option<EndpointTable>,
    pub(crate) timeout_seconds: Option<u64>,
}

impl BuilderState {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}
