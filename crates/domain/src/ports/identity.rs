pub trait IdentityProvider: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StaticIdentity {
    user_id: Option<String>,
}

impl StaticIdentity {
    pub fn new(user_id: Option<String>) -> Self {
        let user_id = user_id
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self { user_id }
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self::new(Some(user_id.into()))
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}
