//! Catalog tab. Prices render as rupiah.

use ratatui::layout::Constraint;

use shopkeep_core::format::currency;
use shopkeep_core::{CatalogItem, CatalogItemDraft, CoreError, Submission, ViewState};

use super::resource::{ResourceScreen, Tabular};
use crate::action::Action;
use crate::screen::ScreenId;

pub type CatalogScreen = ResourceScreen<CatalogItem>;

impl Tabular for CatalogItem {
    type Form = CatalogItemDraft;

    const SCREEN: ScreenId = ScreenId::Catalog;
    const HEADERS: &'static [&'static str] = &["Name", "Price", "Stock", "ID"];

    fn widths() -> Vec<Constraint> {
        vec![
            Constraint::Min(18),
            Constraint::Length(18),
            Constraint::Length(8),
            Constraint::Length(26),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            currency(self.price),
            self.stock.to_string(),
            self.id.to_string(),
        ]
    }

    fn view_update(action: &Action) -> Option<&ViewState<Self>> {
        match action {
            Action::ItemsUpdated(state) => Some(state),
            _ => None,
        }
    }

    fn write_result(action: &Action) -> Option<(u64, &Result<Self, CoreError>)> {
        match action {
            Action::ItemWritten { ticket, result } => Some((*ticket, result)),
            _ => None,
        }
    }

    fn submit_action(submission: Submission<Self>) -> Action {
        Action::SubmitItem(submission)
    }

    fn delete_action(target: Self) -> Action {
        Action::DeleteItem(target)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use shopkeep_core::EntityId;

    use super::*;

    #[test]
    fn price_cell_is_rupiah() {
        let item = CatalogItem {
            id: EntityId::from("64b000000000000000000001"),
            name: "Kopi".into(),
            price: 1_500_000.0,
            stock: 0,
        };
        assert_eq!(
            item.cells(),
            vec!["Kopi", "Rp 1.500.000", "0", "64b000000000000000000001"]
        );
    }
}
