use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

/// Bearer-token session registry, process lifetime.
///
/// The token carries user identity only; review position and stats live
/// server-side in their own stores.
#[derive(Default)]
pub struct Sessions {
    inner: RwLock<HashMap<String, String>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, user_id: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.inner
            .write()
            .expect("session registry poisoned")
            .insert(token.clone(), user_id.to_owned());
        token
    }

    pub fn resolve(&self, token: &str) -> Option<String> {
        self.inner
            .read()
            .expect("session registry poisoned")
            .get(token)
            .cloned()
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.inner
            .write()
            .expect("session registry poisoned")
            .remove(token)
            .is_some()
    }
}
