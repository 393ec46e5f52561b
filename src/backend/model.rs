use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Largest decoded avatar accepted from the upload widget.
pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Base,
    Standard,
    Premium,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Base, Plan::Standard, Plan::Premium];

    pub fn is_top(self) -> bool {
        self == Plan::Premium
    }

    pub fn is_lowest(self) -> bool {
        self == Plan::Base
    }

    /// Tiers strictly above this one, cheapest first.
    pub fn upgrades(self) -> impl Iterator<Item = Plan> {
        Self::ALL.into_iter().filter(move |p| *p > self)
    }

    pub fn monthly_price(self) -> &'static str {
        match self {
            Plan::Base => "Free",
            Plan::Standard => "4.99 €",
            Plan::Premium => "9.99 €",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Plan::Base => "Base",
            Plan::Standard => "Standard",
            Plan::Premium => "Premium",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub username: String,
    pub full_name: String,
    pub email: String,
    // Write-only: the server never sends it back and it is only sent when retyped.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub cell_phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub plan: Plan,
}

impl Account {
    /// Uppercased initials of the full name, used when there is no avatar.
    pub fn initials(&self) -> String {
        let initials: String = self
            .full_name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .collect();
        if initials.is_empty() {
            self.username.chars().take(1).collect::<String>().to_uppercase()
        } else {
            initials.to_uppercase()
        }
    }

    /// Copy handed to the edit form: the password field starts blank.
    pub fn draft(&self) -> Account {
        Account {
            password: String::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_by: String,
}

/// Keeps only the recipes authored by `username`.
pub fn recipes_created_by(recipes: Vec<RecipeSummary>, username: &str) -> Vec<RecipeSummary> {
    recipes
        .into_iter()
        .filter(|r| r.created_by == username)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UploadError {
    #[error("only image files can be used as avatar (got {0})")]
    NotAnImage(String),
    #[error("the uploaded file could not be read")]
    BadEncoding,
    #[error("the image is too large ({0} bytes, max 2 MiB)")]
    TooLarge(usize),
}

/// Turns a file picked in the upload widget into an avatar `data:` URL.
pub fn avatar_from_upload(mime: &str, data_b64: &str) -> Result<String, UploadError> {
    if !mime.starts_with("image/") {
        return Err(UploadError::NotAnImage(mime.to_string()));
    }
    let bytes = STANDARD
        .decode(data_b64)
        .map_err(|_| UploadError::BadEncoding)?;
    if bytes.len() > MAX_AVATAR_BYTES {
        return Err(UploadError::TooLarge(bytes.len()));
    }
    Ok(format!("data:{};base64,{}", mime, data_b64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_wire_format() {
        let json = r#"{
            "username": "mario",
            "fullName": "Mario Rossi",
            "email": "mario@example.com",
            "cellPhone": "333 123 4567",
            "plan": "standard"
        }"#;
        let account: Account = serde_json::from_str(json).expect("valid account");
        assert_eq!(account.full_name, "Mario Rossi");
        assert_eq!(account.cell_phone.as_deref(), Some("333 123 4567"));
        assert_eq!(account.birth_date, None);
        assert_eq!(account.plan, Plan::Standard);

        let out = serde_json::to_value(&account).unwrap();
        assert!(out.get("password").is_none());
        assert_eq!(out["fullName"], "Mario Rossi");
    }

    #[test]
    fn test_plan_ordering_and_upgrades() {
        assert_eq!(Plan::Base.upgrades().collect::<Vec<_>>(), vec![Plan::Standard, Plan::Premium]);
        assert_eq!(Plan::Standard.upgrades().collect::<Vec<_>>(), vec![Plan::Premium]);
        assert_eq!(Plan::Premium.upgrades().count(), 0);
        assert!(Plan::Premium.is_top());
        assert!(Plan::Base.is_lowest());
    }

    #[test]
    fn test_recipes_filtered_by_author() {
        let recipes: Vec<RecipeSummary> = serde_json::from_str(
            r#"[
                {"_id": "1", "name": "Carbonara", "createdBy": "mario"},
                {"_id": "2", "name": "Paella", "createdBy": "lucia"},
                {"_id": "3", "name": "Tiramisu", "summary": "Dessert", "imageUrl": "/t.png", "createdBy": "mario"}
            ]"#,
        )
        .unwrap();
        let mine = recipes_created_by(recipes, "mario");
        let ids: Vec<_> = mine.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(mine[1].image_url.as_deref(), Some("/t.png"));
    }

    #[test]
    fn test_initials() {
        let mut account = Account {
            username: "mario".into(),
            full_name: "mario rossi bianchi".into(),
            ..Default::default()
        };
        assert_eq!(account.initials(), "MR");
        account.full_name.clear();
        assert_eq!(account.initials(), "M");
    }

    #[test]
    fn test_avatar_upload_limits() {
        let small = STANDARD.encode([0u8; 16]);
        let url = avatar_from_upload("image/png", &small).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        assert_eq!(
            avatar_from_upload("application/pdf", &small),
            Err(UploadError::NotAnImage("application/pdf".into()))
        );
        assert_eq!(avatar_from_upload("image/png", "!!not base64!!"), Err(UploadError::BadEncoding));

        let big = STANDARD.encode(vec![0u8; MAX_AVATAR_BYTES + 1]);
        assert_eq!(
            avatar_from_upload("image/jpeg", &big),
            Err(UploadError::TooLarge(MAX_AVATAR_BYTES + 1))
        );
    }
}
