use crate::ProviderConfig;
use crate::parser::ResponseParser;
use crate::settings::Settings;

#[derive(Clone)]
pub(crate) struct ServerState {
    pub(crate) settings: Settings,
    pub(crate) parser: ResponseParser,
    pub(crate) provider_config: ProviderConfig,
}
