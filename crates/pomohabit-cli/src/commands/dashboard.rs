use pomohabit_core::ChangeNotifier;

use crate::context::AppContext;

pub fn run(json: bool, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    let habits = ctx.open_habits(ChangeNotifier::new())?;
    let summary = habits.todays_summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Today's Progress");
    println!("  Pomodoros:        {}", summary.total_sessions);
    println!("  Habits worked on: {}", summary.habits_touched);

    if !summary.notes.is_empty() {
        println!();
        println!("Today's Notes");
        for note in &summary.notes {
            println!("  {}: {}", note.habit_title, note.note);
        }
    }
    Ok(())
}
