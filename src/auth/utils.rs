use crate::errors::{AppError, AppResult};

/// The authenticated caller. Every service operation receives it explicitly;
/// nothing reads identity from shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
}

impl Principal {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
        }
    }
}

pub fn require_principal(principal: Option<&Principal>) -> AppResult<&Principal> {
    match principal {
        Some(p) if !p.user_id.trim().is_empty() => Ok(p),
        _ => Err(AppError::AuthenticationRequired(
            "No authenticated user is bound to this operation".to_string(),
        )),
    }
}

pub fn require_owner(principal: &Principal, resource_owner: &str) -> AppResult<()> {
    if principal.user_id != resource_owner {
        return Err(AppError::Forbidden(
            "You can only access your own statistics".to_string(),
        ));
    }
    Ok(())
}
