//! Catalog item command handlers.

use tabled::Tabled;

use shopkeep_core::format::currency;
use shopkeep_core::{CatalogItem, CatalogItemDraft, Draft, EntityId, FormMachine, Notification};

use crate::cli::{GlobalOpts, ItemsArgs, ItemsCommand, OutputFormat};
use crate::config::CliConsole;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Stock")]
    stock: i64,
}

impl From<&CatalogItem> for ItemRow {
    fn from(p: &CatalogItem) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            price: currency(p.price),
            stock: p.stock,
        }
    }
}

fn detail(p: &CatalogItem) -> String {
    format!(
        "ID:     {}\nName:   {}\nPrice:  {}\nStock:  {}",
        p.id,
        p.name,
        currency(p.price),
        p.stock
    )
}

fn print_collection(console: &CliConsole, global: &GlobalOpts) {
    let rows = console.items().items();
    let out = output::render_list(
        &global.output,
        &rows,
        |p| ItemRow::from(p),
        |p| p.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

fn print_written(console: &CliConsole, item: &CatalogItem, verb: &str, global: &GlobalOpts) {
    if matches!(global.output, OutputFormat::Table) {
        let note = Notification::success("Saved", format!("Product {} {verb}.", item.name));
        output::print_notification(&note, global.quiet, output::should_color(global.no_color));
        print_collection(console, global);
    } else {
        let out = output::render_single(&global.output, item, detail, |p| p.id.to_string());
        output::print_output(&out, global.quiet);
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &CliConsole,
    args: ItemsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ItemsCommand::List => {
            console.refresh::<CatalogItem>().await?;
            print_collection(console, global);
            Ok(())
        }

        ItemsCommand::Get { id } => {
            let item: CatalogItem = console.fetch(&EntityId::from(id)).await?;
            let out = output::render_single(&global.output, &item, detail, |p| p.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ItemsCommand::Create { name, price, stock } => {
            let mut form = FormMachine::<CatalogItemDraft>::new();
            form.open_create();
            if let Some(draft) = form.draft_mut() {
                draft.name = name;
                draft.price = price;
                draft.stock = stock;
            }
            let item = util::submit(console, &mut form).await?;
            print_written(console, &item, "created", global);
            Ok(())
        }

        ItemsCommand::Update {
            id,
            name,
            price,
            stock,
        } => {
            if name.is_none() && price.is_none() && stock.is_none() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "pass at least one of --name, --price, --stock".into(),
                });
            }

            let current: CatalogItem = console.fetch(&EntityId::from(id)).await?;
            let mut form = FormMachine::<CatalogItemDraft>::new();
            form.open_edit(&current);
            if let Some(draft) = form.draft_mut() {
                for (key, value) in [("name", name), ("price", price), ("stock", stock)] {
                    if let Some(value) = value {
                        draft.set(key, value);
                    }
                }
            }
            let item = util::submit(console, &mut form).await?;
            print_written(console, &item, "updated", global);
            Ok(())
        }

        ItemsCommand::Delete { id } => {
            let target: CatalogItem = console.fetch(&EntityId::from(id)).await?;
            if util::delete(console, &target, global).await?
                && matches!(global.output, OutputFormat::Table)
            {
                print_collection(console, global);
            }
            Ok(())
        }
    }
}
