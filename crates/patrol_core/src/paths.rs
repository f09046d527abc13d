use std::env;
use std::path::PathBuf;

/// Overrides the default save location when set.
pub const SAVE_PATH_ENV: &str = "PATROL_SE_SAVE";

const GAME_DIR: &str = "Psycho Patrol R";
const SAVE_FILE_NAME: &str = "newgame.save";

/// Where Godot keeps the game's save for the current user, if the relevant
/// environment variables are set.
pub fn default_save_path() -> Option<PathBuf> {
    let user_data = if cfg!(windows) {
        PathBuf::from(env::var_os("APPDATA")?).join("Godot")
    } else {
        let data_home = env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share")))?;
        data_home.join("godot")
    };
    Some(
        user_data
            .join("app_userdata")
            .join(GAME_DIR)
            .join(SAVE_FILE_NAME),
    )
}
