// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messenger for deterministic testing.
//!
//! `MockMessenger` implements `Messenger` with configurable profiles,
//! injectable lookup/push failures, and captured pushes for assertion.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use tally_core::error::TallyError;
use tally_core::traits::{Messenger, Profile};

/// A mock chat platform for testing.
///
/// Profiles are looked up from in-memory maps; a lookup for an unknown user
/// fails like the real platform's 404 would. Pushes are captured as
/// `(to, text)` pairs via [`pushed_messages`](Self::pushed_messages).
#[derive(Default)]
pub struct MockMessenger {
    user_profiles: Mutex<HashMap<String, String>>,
    group_profiles: Mutex<HashMap<(String, String), String>>,
    fail_all_lookups: AtomicBool,
    failing_push_targets: Mutex<HashSet<String>>,
    pushed: Mutex<Vec<(String, String)>>,
}

impl MockMessenger {
    /// Create a mock with no profiles and no failures configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a direct-message profile.
    pub async fn set_user_profile(&self, user_id: &str, display_name: &str) {
        self.user_profiles
            .lock()
            .await
            .insert(user_id.to_string(), display_name.to_string());
    }

    /// Register a group-member profile.
    pub async fn set_group_profile(&self, group_id: &str, user_id: &str, display_name: &str) {
        self.group_profiles
            .lock()
            .await
            .insert((group_id.to_string(), user_id.to_string()), display_name.to_string());
    }

    /// Make every profile lookup fail from now on.
    pub fn fail_lookups(&self) {
        self.fail_all_lookups.store(true, Ordering::SeqCst);
    }

    /// Make pushes to the given conversation fail.
    pub async fn fail_pushes_to(&self, to: &str) {
        self.failing_push_targets.lock().await.insert(to.to_string());
    }

    /// All `(to, text)` pairs captured by `push_text`, in push order.
    pub async fn pushed_messages(&self) -> Vec<(String, String)> {
        self.pushed.lock().await.clone()
    }

    /// Number of captured pushes.
    pub async fn pushed_count(&self) -> usize {
        self.pushed.lock().await.len()
    }

    fn lookup_failure(&self, what: &str) -> TallyError {
        TallyError::Channel {
            message: format!("mock lookup failure: {what}"),
            source: None,
        }
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn user_profile(&self, user_id: &str) -> Result<Profile, TallyError> {
        if self.fail_all_lookups.load(Ordering::SeqCst) {
            return Err(self.lookup_failure(user_id));
        }
        self.user_profiles
            .lock()
            .await
            .get(user_id)
            .map(|name| Profile {
                display_name: name.clone(),
            })
            .ok_or_else(|| self.lookup_failure(user_id))
    }

    async fn group_member_profile(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Profile, TallyError> {
        if self.fail_all_lookups.load(Ordering::SeqCst) {
            return Err(self.lookup_failure(user_id));
        }
        self.group_profiles
            .lock()
            .await
            .get(&(group_id.to_string(), user_id.to_string()))
            .map(|name| Profile {
                display_name: name.clone(),
            })
            .ok_or_else(|| self.lookup_failure(user_id))
    }

    async fn push_text(&self, to: &str, text: &str) -> Result<(), TallyError> {
        if self.failing_push_targets.lock().await.contains(to) {
            return Err(TallyError::Channel {
                message: format!("mock push failure: {to}"),
                source: None,
            });
        }
        self.pushed
            .lock()
            .await
            .push((to.to_string(), text.to_string()));
        Ok(())
    }
}
