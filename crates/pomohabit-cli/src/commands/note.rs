use clap::Subcommand;
use pomohabit_core::ChangeNotifier;

use crate::context::{ensure_saved, resolve_habit, AppContext};

#[derive(Subcommand)]
pub enum NoteAction {
    /// Set today's note for a habit
    Set {
        /// Habit id, id prefix, or title
        id: String,
        /// Note text (replaces any earlier note today)
        text: String,
    },
    /// Clear today's note for a habit
    Clear {
        /// Habit id, id prefix, or title
        id: String,
    },
    /// List today's non-empty notes
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: NoteAction, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    let mut habits = ctx.open_habits(ChangeNotifier::new())?;

    match action {
        NoteAction::Set { id, text } => {
            let id = resolve_habit(&habits, &id)?;
            habits.set_note(&id, text);
            ensure_saved(&habits)?;
            println!("ok");
        }
        NoteAction::Clear { id } => {
            let id = resolve_habit(&habits, &id)?;
            habits.clear_note(&id);
            ensure_saved(&habits)?;
            println!("ok");
        }
        NoteAction::List { json } => {
            let notes = habits.todays_notes_with_habit();
            if json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else if notes.is_empty() {
                println!("No notes today.");
            } else {
                for note in notes {
                    println!("{}: {}", note.habit_title, note.note);
                }
            }
        }
    }
    Ok(())
}
