//! Process-wide account state for each backend.
//!
//! Backends read this on every call, so connecting or disconnecting takes
//! effect without rebuilding any component.

use super::backend::BackendKind;
use crate::shared::config::SyncConfig;
use crate::{log_info, log_warn};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendAccount {
    /// Account name sent along with requests, if the backend needs one.
    pub account: Option<String>,
    pub token: String,
}

impl BackendAccount {
    pub fn new(account: Option<String>, token: impl Into<String>) -> Self {
        Self {
            account,
            token: token.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct BackendSettings {
    accounts: RwLock<HashMap<BackendKind, BackendAccount>>,
}

impl BackendSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect every backend that has complete credentials in the config.
    pub fn from_config(config: &SyncConfig) -> Self {
        let settings = Self::new();
        if let Some(cloud) = &config.cloud {
            settings.connect(
                BackendKind::Cloud,
                BackendAccount::new(Some(cloud.account.clone()), cloud.token.clone()),
            );
        }
        if let Some(social) = &config.social {
            settings.connect(
                BackendKind::Social,
                BackendAccount::new(None, social.access_token.clone()),
            );
        }
        settings
    }

    pub fn connect(&self, kind: BackendKind, account: BackendAccount) {
        self.write().insert(kind, account);
        log_info!("Backend {} connected", kind);
    }

    /// Returns whether the backend was connected before.
    pub fn disconnect(&self, kind: BackendKind) -> bool {
        let removed = self.write().remove(&kind).is_some();
        if removed {
            log_info!("Backend {} disconnected", kind);
        }
        removed
    }

    pub fn is_enabled(&self, kind: BackendKind) -> bool {
        self.read().contains_key(&kind)
    }

    pub fn any_enabled(&self) -> bool {
        !self.read().is_empty()
    }

    /// Connected backends in delivery order.
    pub fn enabled_kinds(&self) -> Vec<BackendKind> {
        let accounts = self.read();
        BackendKind::ALL
            .into_iter()
            .filter(|kind| accounts.contains_key(kind))
            .collect()
    }

    pub fn account(&self, kind: BackendKind) -> Option<BackendAccount> {
        self.read().get(&kind).cloned()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<BackendKind, BackendAccount>> {
        self.accounts.read().unwrap_or_else(|poisoned| {
            log_warn!("Backend settings lock was poisoned, continuing");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<BackendKind, BackendAccount>> {
        self.accounts.write().unwrap_or_else(|poisoned| {
            log_warn!("Backend settings lock was poisoned, continuing");
            poisoned.into_inner()
        })
    }
}
