use std::env;

use quiz_profile::HttpProfileStore;

#[derive(Debug, Clone)]
pub struct Config {
    /// WebSocket endpoint of the game server.
    pub server_url: String,
    /// Base URL of the user profile API.
    pub profile_api_url: String,
}

impl Config {
    pub fn new() -> Self {
        Self {
            server_url: env::var("SERVER_URL").unwrap_or_else(|_| "ws://localhost:5000/".to_string()),
            profile_api_url: env::var("PROFILE_API_URL")
                .unwrap_or_else(|_| "http://localhost:3000/api".to_string()),
        }
    }

    pub fn profile_store(&self) -> HttpProfileStore {
        HttpProfileStore::new(self.profile_api_url.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
