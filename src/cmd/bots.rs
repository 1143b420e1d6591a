//! Bot selection commands (`msort-health bots`).

use anyhow::Result;

use msort_health::config::HealthConfig;
use msort_health::entities::EntitySelection;
use msort_health::store::{SavedSelection, SelectionStore};
use msort_health::ui::icons::{CHECK, ROBOT};

use super::super::BotsCommands;

pub fn cmd_bots(config: &HealthConfig, command: BotsCommands) -> Result<()> {
    let store = SelectionStore::in_dir(&config.state_dir());
    let previous = store.load()?;

    let saved = match command {
        BotsCommands::Show => {
            print_selection(&store, &previous);
            return Ok(());
        }
        BotsCommands::Range { start, end } => {
            let selection = EntitySelection::from_range(start, end)?;
            SavedSelection {
                start,
                end,
                bot_ids: selection.into_ids(),
                ..previous
            }
        }
        BotsCommands::Manual { ids } => {
            let input = ids.join(" ");
            let selection = EntitySelection::from_manual(&input)?;
            SavedSelection {
                manual: input,
                bot_ids: selection.into_ids(),
                ..previous
            }
        }
    };

    store.save(&saved)?;
    println!(
        "{}Saved {} bot{}: {}",
        CHECK,
        saved.bot_ids.len(),
        if saved.bot_ids.len() == 1 { "" } else { "s" },
        saved.bot_ids.join(", ")
    );
    Ok(())
}

fn print_selection(store: &SelectionStore, saved: &SavedSelection) {
    println!();
    println!("{}Bot Selection", ROBOT);
    println!("================");
    println!();
    println!("File: {}", store.path().display());
    println!("  range  = B{} .. B{}", saved.start, saved.end);
    println!("  manual = \"{}\"", saved.manual);
    if saved.bot_ids.is_empty() {
        println!("  bots   = (none)");
        println!();
        println!("Run 'msort-health bots range <start> <end>' to select bots.");
    } else {
        println!("  bots   = {}", saved.bot_ids.join(", "));
    }
    println!();
}
