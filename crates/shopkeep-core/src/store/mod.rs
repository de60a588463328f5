// ── Collection views ──
//
// One watch-backed snapshot per resource kind. Writes never patch a
// snapshot in place; a view only advances through a fresh `list()`.

mod view;

pub use view::{CollectionView, ViewState};
