use serde::{ Deserialize, Serialize };

/// Profile sent along with every chat request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub name: String,
    pub age: u32,
}

impl UserInfo {
    /// Identity used when the user never filled in a profile.
    pub fn anonymous(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: String::new(),
            age: 0,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty() && self.age == 0
    }
}
