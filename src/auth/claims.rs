use serde::{Deserialize, Serialize};

use crate::auth::Principal;

/// Claims issued by the identity provider. Only `sub` matters here: it is the
/// stable user id every stats and attempt record is keyed by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn principal(&self) -> Principal {
        Principal::new(&self.sub)
    }
}

#[cfg(test)]
impl Claims {
    pub fn for_subject(sub: &str, lifetime_secs: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: sub.to_string(),
            email: Some(format!("{}@example.com", sub)),
            iat: now as usize,
            exp: (now + lifetime_secs) as usize,
        }
    }
}
