use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

pub const AZURE_CLIENT_ID_FALLBACK: &str = "00000000402B5328";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountMode {
    Offline,
    Microsoft,
    Mojang,
}

/// Identity fields the launch arguments need from an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchAccountProfile {
    pub mode: AccountMode,
    pub username: String,
    pub uuid: String,
    pub access_token: String,
    pub xuid: String,
    pub user_type: String,
    pub client_id: String,
}

impl Default for LaunchAccountProfile {
    fn default() -> Self {
        Self::offline("Player")
    }
}

impl LaunchAccountProfile {
    pub fn offline(username: &str) -> Self {
        Self {
            mode: AccountMode::Offline,
            username: username.trim().to_string(),
            uuid: "00000000-0000-0000-0000-000000000000".into(),
            access_token: "offline_access_token".into(),
            xuid: "0".into(),
            user_type: "legacy".into(),
            client_id: AZURE_CLIENT_ID_FALLBACK.into(),
        }
    }

    /// Fill blank fields with values the game accepts.
    pub fn sanitized(mut self) -> Self {
        if self.username.trim().is_empty() {
            self.username = "Player".into();
        }
        if self.uuid.trim().is_empty() {
            self.uuid = "00000000-0000-0000-0000-000000000000".into();
        }
        if self.access_token.trim().is_empty() {
            self.access_token = "offline_access_token".into();
        }
        if self.xuid.trim().is_empty() {
            self.xuid = "0".into();
        }
        if self.user_type.trim().is_empty() {
            self.user_type = match self.mode {
                AccountMode::Offline => "legacy".into(),
                AccountMode::Microsoft => "msa".into(),
                AccountMode::Mojang => "mojang".into(),
            };
        }
        if self.client_id.trim().is_empty() {
            self.client_id = AZURE_CLIENT_ID_FALLBACK.into();
        }
        self
    }
}

// ─── Account store (read-only) ───
// The file is owned by the login flows; the core never writes it.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub xuid: String,
    #[serde(default)]
    pub client_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountStore {
    #[serde(default)]
    pub accounts: BTreeMap<String, AccountRecord>,
}

impl AccountStore {
    pub fn load(path: &Path) -> LauncherResult<Self> {
        let raw = std::fs::read(path).map_err(|source| LauncherError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store: AccountStore = serde_json::from_slice(&raw)?;
        debug!("Loaded {} accounts from {:?}", store.accounts.len(), path);
        Ok(store)
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Launch profile for the account stored under `account_id`.
    ///
    /// The account id doubles as the player UUID.
    pub fn profile(&self, account_id: &str) -> Option<LaunchAccountProfile> {
        let record = self.accounts.get(account_id)?;
        let user_type = record.account_type.to_lowercase();
        let mode = match user_type.as_str() {
            "msa" | "microsoft" => AccountMode::Microsoft,
            "mojang" => AccountMode::Mojang,
            _ => AccountMode::Offline,
        };

        Some(
            LaunchAccountProfile {
                mode,
                username: record.username.clone(),
                uuid: account_id.to_string(),
                access_token: record.access_token.clone(),
                xuid: record.xuid.clone(),
                user_type,
                client_id: record.client_token.clone(),
            }
            .sanitized(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_from_store_lowercases_type() {
        let store: AccountStore = serde_json::from_str(
            r#"{"accounts": {"0123abcd": {
                "accessToken": "token", "username": "Steve", "type": "MSA",
                "xuid": "42", "clientToken": "client"
            }}}"#,
        )
        .unwrap();

        let profile = store.profile("0123abcd").unwrap();
        assert_eq!(profile.mode, AccountMode::Microsoft);
        assert_eq!(profile.user_type, "msa");
        assert_eq!(profile.uuid, "0123abcd");
        assert_eq!(profile.client_id, "client");
        assert!(store.profile("missing").is_none());
    }

    #[test]
    fn sanitized_fills_blank_fields() {
        let profile = LaunchAccountProfile {
            mode: AccountMode::Microsoft,
            username: " ".into(),
            uuid: String::new(),
            access_token: String::new(),
            xuid: String::new(),
            user_type: String::new(),
            client_id: String::new(),
        }
        .sanitized();

        assert_eq!(profile.username, "Player");
        assert_eq!(profile.user_type, "msa");
        assert_eq!(profile.client_id, AZURE_CLIENT_ID_FALLBACK);
    }

    #[test]
    fn empty_store_file() {
        let store: AccountStore = serde_json::from_str("{}").unwrap();
        assert!(store.is_empty());
    }
}
