//! Paths, configuration and repository wiring shared by all commands.

use std::error::Error;
use std::path::{Path, PathBuf};

use pomohabit_core::{ChangeNotifier, Config, Database, HabitId, HabitRepository, SystemClock};

/// Returns `~/.config/pomohabit[-dev]/` based on POMOHABIT_ENV.
///
/// Set POMOHABIT_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMOHABIT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomohabit-dev")
    } else {
        base_dir.join("pomohabit")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

pub struct AppContext {
    pub data_dir: PathBuf,
    pub config: Config,
}

impl AppContext {
    pub fn load() -> Result<Self, Box<dyn Error>> {
        let data_dir = data_dir()?;
        let config = Config::load_from(&config_path(&data_dir))?;
        Ok(Self { data_dir, config })
    }

    pub fn config_path(&self) -> PathBuf {
        config_path(&self.data_dir)
    }

    pub fn open_habits(&self, notifier: ChangeNotifier) -> Result<HabitRepository, Box<dyn Error>> {
        let db = Database::open(self.data_dir.join(&self.config.storage.database))?;
        let calendar = self.config.day_calendar()?;
        let (habits, load_error) =
            HabitRepository::open(Box::new(db), Box::new(SystemClock), calendar, notifier);
        if let Some(e) = load_error {
            eprintln!("warning: {e}; starting with an empty habit list");
        }
        Ok(habits)
    }
}

/// Find a habit by full id, exact title, or unique id prefix, in that order.
pub fn resolve_habit(habits: &HabitRepository, query: &str) -> Result<HabitId, Box<dyn Error>> {
    let query = query.trim();
    if query.is_empty() {
        return Err("habit id or title must not be empty".into());
    }

    if let Ok(id) = query.parse::<HabitId>() {
        if habits.get(&id).is_some() {
            return Ok(id);
        }
    }

    let by_title: Vec<_> = habits
        .habits()
        .iter()
        .filter(|h| h.title.eq_ignore_ascii_case(query))
        .collect();
    match by_title.as_slice() {
        [one] => return Ok(one.id),
        [] => {}
        _ => return Err(format!("several habits are titled '{query}', use the id").into()),
    }

    let prefix = query.to_ascii_lowercase();
    let by_prefix: Vec<_> = habits
        .habits()
        .iter()
        .filter(|h| h.id.to_string().starts_with(&prefix))
        .collect();
    match by_prefix.as_slice() {
        [one] => Ok(one.id),
        [] => Err(format!("Habit not found: {query}").into()),
        _ => Err(format!("ambiguous habit id prefix: {query}").into()),
    }
}

/// Turn a swallowed write failure into a command error.
pub fn ensure_saved(habits: &HabitRepository) -> Result<(), Box<dyn Error>> {
    match habits.last_persist_error() {
        Some(e) => Err(format!("changes were not saved: {e}").into()),
        None => Ok(()),
    }
}

pub fn short_id(id: &HabitId) -> String {
    id.to_string().chars().take(8).collect()
}
