// Form drafts and field validation.
//
// A draft holds raw text exactly as typed. Parsing and validation happen
// only on submit, producing the typed create/patch payload or a
// field-level `Validation` error.

use std::fmt;

use secrecy::SecretString;

use crate::error::CoreError;
use crate::model::{
    Account, AccountPatch, CatalogItem, CatalogItemPatch, NewAccount, NewCatalogItem, Resource,
};

/// Static description of one editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    /// Rendered masked and never pre-filled.
    pub secret: bool,
}

/// Editable, unsaved state for one resource kind.
pub trait Draft: fmt::Debug + Default + Clone + Send + Sync + 'static {
    type Target: Resource;

    const FIELDS: &'static [FieldSpec];

    /// Copy an entity's fields for editing. Secret fields start empty.
    fn from_entity(entity: &Self::Target) -> Self;

    fn value(&self, idx: usize) -> &str;

    fn value_mut(&mut self, idx: usize) -> Option<&mut String>;

    /// Validate for `create`.
    fn to_create(&self) -> Result<<Self::Target as Resource>::Create, CoreError>;

    /// Validate for `update`, keeping only fields that differ from `original`.
    fn to_patch(
        &self,
        original: &Self::Target,
    ) -> Result<<Self::Target as Resource>::Patch, CoreError>;

    /// Set a field by key. Returns `false` for unknown keys.
    fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        let Some(idx) = Self::FIELDS.iter().position(|f| f.key == key) else {
            return false;
        };
        match self.value_mut(idx) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }
}

// ── Field rules ─────────────────────────────────────────────────────

pub fn validate_name(raw: &str) -> Result<String, CoreError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CoreError::validation("name", "Name is required"));
    }
    Ok(name.to_owned())
}

/// `local@domain.tld`: one `@`, no whitespace, a dot inside the domain.
pub fn validate_email(raw: &str) -> Result<String, CoreError> {
    let email = raw.trim();
    let invalid = || CoreError::validation("email", "Enter a valid email address");
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(email.to_owned())
}

pub fn parse_price(raw: &str) -> Result<f64, CoreError> {
    let message = "Price must be a non-negative number";
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| CoreError::validation("price", message))?;
    if !price.is_finite() || price < 0.0 {
        return Err(CoreError::validation("price", message));
    }
    Ok(price)
}

pub fn parse_stock(raw: &str) -> Result<i64, CoreError> {
    let message = "Stock must be a non-negative whole number";
    let stock: i64 = raw
        .trim()
        .parse()
        .map_err(|_| CoreError::validation("stock", message))?;
    if stock < 0 {
        return Err(CoreError::validation("stock", message));
    }
    Ok(stock)
}

// ── AccountDraft ────────────────────────────────────────────────────

#[derive(Clone, Default, PartialEq, Eq)]
pub struct AccountDraft {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AccountDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountDraft")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Draft for AccountDraft {
    type Target = Account;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec {
            key: "name",
            label: "Name",
            secret: false,
        },
        FieldSpec {
            key: "email",
            label: "Email",
            secret: false,
        },
        FieldSpec {
            key: "password",
            label: "Password",
            secret: true,
        },
    ];

    fn from_entity(entity: &Account) -> Self {
        Self {
            name: entity.name.clone(),
            email: entity.email.clone(),
            password: String::new(),
        }
    }

    fn value(&self, idx: usize) -> &str {
        match idx {
            0 => &self.name,
            1 => &self.email,
            2 => &self.password,
            _ => "",
        }
    }

    fn value_mut(&mut self, idx: usize) -> Option<&mut String> {
        match idx {
            0 => Some(&mut self.name),
            1 => Some(&mut self.email),
            2 => Some(&mut self.password),
            _ => None,
        }
    }

    fn to_create(&self) -> Result<NewAccount, CoreError> {
        let name = validate_name(&self.name)?;
        let email = validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(CoreError::validation("password", "Password is required"));
        }
        Ok(NewAccount {
            name,
            email,
            password: SecretString::from(self.password.clone()),
        })
    }

    fn to_patch(&self, original: &Account) -> Result<AccountPatch, CoreError> {
        let name = validate_name(&self.name)?;
        let email = validate_email(&self.email)?;
        Ok(AccountPatch {
            name: (name != original.name).then_some(name),
            email: (email != original.email).then_some(email),
            // Blank keeps the current password.
            password: (!self.password.is_empty())
                .then(|| SecretString::from(self.password.clone())),
        })
    }
}

// ── CatalogItemDraft ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogItemDraft {
    pub name: String,
    pub price: String,
    pub stock: String,
}

impl Draft for CatalogItemDraft {
    type Target = CatalogItem;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec {
            key: "name",
            label: "Name",
            secret: false,
        },
        FieldSpec {
            key: "price",
            label: "Price",
            secret: false,
        },
        FieldSpec {
            key: "stock",
            label: "Stock",
            secret: false,
        },
    ];

    fn from_entity(entity: &CatalogItem) -> Self {
        Self {
            name: entity.name.clone(),
            price: entity.price.to_string(),
            stock: entity.stock.to_string(),
        }
    }

    fn value(&self, idx: usize) -> &str {
        match idx {
            0 => &self.name,
            1 => &self.price,
            2 => &self.stock,
            _ => "",
        }
    }

    fn value_mut(&mut self, idx: usize) -> Option<&mut String> {
        match idx {
            0 => Some(&mut self.name),
            1 => Some(&mut self.price),
            2 => Some(&mut self.stock),
            _ => None,
        }
    }

    fn to_create(&self) -> Result<NewCatalogItem, CoreError> {
        Ok(NewCatalogItem {
            name: validate_name(&self.name)?,
            price: parse_price(&self.price)?,
            stock: parse_stock(&self.stock)?,
        })
    }

    fn to_patch(&self, original: &CatalogItem) -> Result<CatalogItemPatch, CoreError> {
        let name = validate_name(&self.name)?;
        let price = parse_price(&self.price)?;
        let stock = parse_stock(&self.stock)?;
        Ok(CatalogItemPatch {
            name: (name != original.name).then_some(name),
            price: (price.to_bits() != original.price.to_bits()).then_some(price),
            stock: (stock != original.stock).then_some(stock),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::model::PartialUpdate;

    fn field_of(err: CoreError) -> Option<&'static str> {
        match err {
            CoreError::Validation { field, .. } => field,
            _ => None,
        }
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("ana@x.com").is_ok());
        assert!(validate_email("  ana@mail.example.id ").is_ok());
        for bad in ["", "ana", "@x.com", "ana@", "ana@x", "ana@.com", "a b@x.com", "a@b@c.com"] {
            assert!(validate_email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn numeric_rules() {
        assert!((parse_price("12.50").unwrap() - 12.5).abs() < f64::EPSILON);
        assert!(parse_price("-1").is_err());
        assert!(parse_price("abc").is_err());
        assert!(parse_price("NaN").is_err());
        assert_eq!(parse_stock("0").unwrap(), 0);
        assert!(parse_stock("1.5").is_err());
        assert!(parse_stock("-3").is_err());
    }

    #[test]
    fn account_create_requires_password() {
        let draft = AccountDraft {
            name: "Ana".into(),
            email: "ana@x.com".into(),
            password: String::new(),
        };
        assert_eq!(field_of(draft.to_create().unwrap_err()), Some("password"));
    }

    #[test]
    fn account_edit_clears_password_and_patches_changes_only() {
        let original = Account {
            id: "u1".into(),
            name: "Ana".into(),
            email: "ana@x.com".into(),
        };
        let mut draft = AccountDraft::from_entity(&original);
        assert!(draft.password.is_empty());

        draft.name = "Ana Maria".into();
        let patch = draft.to_patch(&original).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Ana Maria"));
        assert!(patch.email.is_none());
        assert!(patch.password.is_none());
    }

    #[test]
    fn catalog_patch_tracks_changed_fields() {
        let original = CatalogItem {
            id: "p1".into(),
            name: "Kopi".into(),
            price: 20_000.0,
            stock: 4,
        };
        let mut draft = CatalogItemDraft::from_entity(&original);
        assert!(draft.to_patch(&original).unwrap().is_empty());

        assert!(draft.set("stock", "9"));
        assert!(!draft.set("colour", "red"));
        let patch = draft.to_patch(&original).unwrap();
        assert_eq!(
            patch,
            CatalogItemPatch {
                stock: Some(9),
                ..Default::default()
            }
        );
    }
}
