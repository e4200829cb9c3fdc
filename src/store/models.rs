use serde::{Deserialize, Serialize};

use super::Record;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Admin,
    Student,
}

/// A privileged account as persisted on disk.
///
/// `password_hash` is stored under the `password` key. Records written before
/// salting existed carry an empty `salt` and keep the plaintext password in
/// that field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub salt: String,
    pub role: Role,
}

impl Account {
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Account view that is safe to hand to clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Category name, not id.
    pub category: String,
    pub file_url: String,
    pub file_size: u64,
    pub upload_date: String,
    /// Teacher id.
    pub uploaded_by: String,
}

impl Record for Account {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Category {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Material {
    fn id(&self) -> &str {
        &self.id
    }
}

pub fn default_admin() -> Account {
    Account {
        id: "admin1".to_string(),
        name: "系统管理员".to_string(),
        email: "admin".to_string(),
        password_hash: "admin123".to_string(),
        salt: String::new(),
        role: Role::Admin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_uses_legacy_field_names() {
        let json = serde_json::to_value(default_admin()).expect("serialize admin");
        assert_eq!(json["password"], "admin123");
        assert_eq!(json["salt"], "");
        assert_eq!(json["role"], "admin");
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn account_without_salt_field_parses() {
        let raw = r#"{"id":"1","name":"李老师","email":"li@example.com","password":"secret","role":"teacher"}"#;
        let account: Account = serde_json::from_str(raw).expect("parse account");
        assert!(account.salt.is_empty());
        assert_eq!(account.role, Role::Teacher);
    }

    #[test]
    fn student_role_parses() {
        let raw = r#"{"id":"2","name":"小明","email":"m@example.com","password":"x","role":"student"}"#;
        let account: Account = serde_json::from_str(raw).expect("parse account");
        assert_eq!(account.role, Role::Student);
    }

    #[test]
    fn material_serializes_camel_case() {
        let material = Material {
            id: "1".into(),
            title: "第一章".into(),
            description: String::new(),
            category: "数学".into(),
            file_url: "/uploads/ch1.pdf".into(),
            file_size: 42,
            upload_date: "2024-01-01T00:00:00.000Z".into(),
            uploaded_by: "7".into(),
        };
        let json = serde_json::to_value(&material).expect("serialize material");
        assert_eq!(json["fileUrl"], "/uploads/ch1.pdf");
        assert_eq!(json["fileSize"], 42);
        assert_eq!(json["uploadedBy"], "7");
        assert_eq!(json["uploadDate"], "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn profile_drops_secrets() {
        let profile = serde_json::to_value(default_admin().profile()).expect("serialize");
        assert!(profile.get("password").is_none());
        assert!(profile.get("salt").is_none());
        assert_eq!(profile["email"], "admin");
    }
}
