//! Screen identifiers.

use std::fmt;

use shopkeep_core::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Accounts, // 1
    Catalog, // 2
    /// Sign-in form; not in the tab bar.
    SignIn,
}

impl ScreenId {
    /// Tab-bar order.
    pub const ALL: [ScreenId; 2] = [Self::Accounts, Self::Catalog];

    pub fn number(self) -> u8 {
        match self {
            Self::Accounts => 1,
            Self::Catalog => 2,
            Self::SignIn => 0,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Accounts),
            2 => Some(Self::Catalog),
            _ => None,
        }
    }

    /// Next tab, wrapping.
    pub fn next(self) -> Self {
        match self {
            Self::Accounts => Self::Catalog,
            Self::Catalog | Self::SignIn => Self::Accounts,
        }
    }

    /// Previous tab, wrapping.
    pub fn prev(self) -> Self {
        // Two tabs: previous and next coincide.
        self.next()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Accounts => "Accounts",
            Self::Catalog => "Catalog",
            Self::SignIn => "Sign in",
        }
    }

    /// The screen listing a resource kind.
    pub fn for_kind(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Account => Self::Accounts,
            ResourceKind::CatalogItem => Self::Catalog,
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn tab_order_wraps() {
        assert_eq!(ScreenId::Accounts.next(), ScreenId::Catalog);
        assert_eq!(ScreenId::Catalog.next(), ScreenId::Accounts);
        assert_eq!(ScreenId::Catalog.prev(), ScreenId::Accounts);
        assert_eq!(ScreenId::from_number(2), Some(ScreenId::Catalog));
        assert_eq!(ScreenId::from_number(3), None);
    }
}
