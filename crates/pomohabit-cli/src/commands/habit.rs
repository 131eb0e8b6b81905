use clap::Subcommand;
use pomohabit_core::ChangeNotifier;

use crate::context::{ensure_saved, resolve_habit, short_id, AppContext};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit title
        title: String,
        /// Optional description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List habits with today's session count
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a habit and its daily history
    Show {
        /// Habit id, id prefix, or title
        id: String,
    },
    /// Change a habit's title or description
    Edit {
        /// Habit id, id prefix, or title
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a habit and its history
    Delete {
        /// Habit id, id prefix, or title
        id: String,
    },
}

pub fn run(action: HabitAction, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    let mut habits = ctx.open_habits(ChangeNotifier::new())?;

    match action {
        HabitAction::Add { title, description } => {
            let title = title.trim();
            if title.is_empty() {
                return Err("habit title must not be empty".into());
            }
            let id = habits.add(title, description);
            ensure_saved(&habits)?;
            println!("Habit created: {id}");
        }
        HabitAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(habits.habits())?);
            } else if habits.habits().is_empty() {
                println!("No habits yet. Add one with `pomohabit habit add <title>`.");
            } else {
                for habit in habits.habits() {
                    println!(
                        "{}  {}  {} Pomodoros today",
                        short_id(&habit.id),
                        habit.title,
                        habits.todays_sessions_for(&habit.id)
                    );
                }
            }
        }
        HabitAction::Show { id } => {
            let id = resolve_habit(&habits, &id)?;
            let Some(habit) = habits.get(&id) else {
                return Err(format!("Habit not found: {id}").into());
            };
            println!("{}", habit.title);
            println!("  id:       {}", habit.id);
            if !habit.description.is_empty() {
                println!("  about:    {}", habit.description);
            }
            println!(
                "  created:  {}",
                habit
                    .created_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
            );
            println!("  today:    {} Pomodoros", habits.todays_sessions_for(&id));
            let note = habits.todays_note_for(&id);
            if !note.is_empty() {
                println!("  note:     {note}");
            }
            for record in &habit.daily_pomodoros {
                let day = habits.calendar().day_of(record.date);
                if record.notes.is_empty() {
                    println!("  {day}  {} Pomodoros", record.completed_sessions);
                } else {
                    println!(
                        "  {day}  {} Pomodoros  {}",
                        record.completed_sessions, record.notes
                    );
                }
            }
        }
        HabitAction::Edit {
            id,
            title,
            description,
        } => {
            let id = resolve_habit(&habits, &id)?;
            let Some(mut habit) = habits.get(&id).cloned() else {
                return Err(format!("Habit not found: {id}").into());
            };
            if let Some(title) = title {
                let title = title.trim();
                if title.is_empty() {
                    return Err("habit title must not be empty".into());
                }
                habit.title = title.to_string();
            }
            if let Some(description) = description {
                habit.description = description;
            }
            habits.update(habit);
            ensure_saved(&habits)?;
            println!("Habit updated: {id}");
        }
        HabitAction::Delete { id } => {
            let id = resolve_habit(&habits, &id)?;
            habits.delete(&id);
            ensure_saved(&habits)?;
            println!("Habit deleted: {id}");
        }
    }
    Ok(())
}
