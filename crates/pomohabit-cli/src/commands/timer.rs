use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use pomohabit_core::{ChangeNotifier, Event, HabitId, IntervalTicks, TimerRegistry};
use tracing::info;

use crate::context::{ensure_saved, resolve_habit, AppContext};

/// How often the run loop polls the tick source.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a work/break timer for a habit in the foreground (Ctrl-C stops)
    Run {
        /// Habit id, id prefix, or title
        id: String,
        /// Start the next phase automatically instead of exiting
        #[arg(long)]
        auto_continue: bool,
        /// Print events as JSON lines instead of a countdown
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: TimerAction, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run {
            id,
            auto_continue,
            json,
        } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let auto_continue = auto_continue || ctx.config.timer.auto_continue;
            runtime.block_on(run_foreground(ctx, &id, auto_continue, json))
        }
    }
}

async fn run_foreground(
    ctx: &AppContext,
    query: &str,
    auto_continue: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let notifier = ChangeNotifier::new();
    let mut habits = ctx.open_habits(notifier.clone())?;
    let habit = resolve_habit(&habits, query)?;
    let title = habits
        .get(&habit)
        .map(|h| h.title.clone())
        .unwrap_or_default();

    let mut timers = TimerRegistry::new(IntervalTicks::new(), notifier.clone());
    let mut changes = notifier.subscribe();

    info!(habit = %habit, auto_continue, "timer run");
    if let Some(event) = timers.start_for(&habit) {
        emit(&event, json)?;
    }
    if !json {
        render(&timers, &habit)?;
    }

    let mut poll = tokio::time::interval(POLL_INTERVAL);
    let mut ctrl_c = std::pin::pin!(tokio::signal::ctrl_c());

    loop {
        tokio::select! {
            _ = poll.tick() => {
                let mut finished = false;
                for event in timers.pump(&mut habits) {
                    emit(&event, json)?;
                    ensure_saved(&habits)?;
                    if auto_continue {
                        if let Some(started) = timers.start_for(&habit) {
                            emit(&started, json)?;
                        }
                    } else {
                        finished = true;
                    }
                }
                if changes.has_changed().unwrap_or(false) {
                    changes.borrow_and_update();
                    if !json {
                        render(&timers, &habit)?;
                    }
                }
                if finished {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                if let Some(event) = timers.stop_for(&habit) {
                    emit(&event, json)?;
                }
                break;
            }
        }
    }

    if !json {
        println!(
            "{title}: {} Pomodoros today",
            habits.todays_sessions_for(&habit)
        );
    }
    Ok(())
}

/// Line-oriented output: JSON events, or a finished-line for text mode.
fn emit(event: &Event, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    match event {
        Event::PhaseCompleted { from, to } => {
            println!("\n{} finished, {} next", from.label(), to.label());
        }
        Event::TimerStopped { .. } => println!("\nstopped"),
        _ => {}
    }
    Ok(())
}

/// Redraw the countdown in place.
fn render(timers: &TimerRegistry, habit: &HabitId) -> Result<(), Box<dyn std::error::Error>> {
    let Some(timer) = timers.timer_for(habit) else {
        return Ok(());
    };
    let mut out = std::io::stdout().lock();
    write!(
        out,
        "\r{}  {}  ",
        timer.phase().label(),
        timer.formatted_remaining()
    )?;
    out.flush()?;
    Ok(())
}
