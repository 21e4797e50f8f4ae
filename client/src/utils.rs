use dirs::home_dir;
use std::{
    env, fs,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, Once},
};

const DEFAULT_DIR_NAME: &str = ".household_ledger";
const LOG_FILE: &str = "ledger.log";

static TRACING_INIT: Once = Once::new();

/// Data directory, `$LEDGER_HOME` or `~/.household_ledger`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("LEDGER_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Routes tracing output to `<dir>/ledger.log`; the terminal belongs to the UI.
pub fn init_tracing(dir: &Path) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("household_ledger=info"));
        let _ = fs::create_dir_all(dir);
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(LOG_FILE))
        {
            Ok(file) => {
                let _ = fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
            }
            Err(_) => {
                let _ = fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::sink)
                    .try_init();
            }
        }
    });
}

/// Stages to a sibling `.tmp` file then renames over `path`.
pub fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(tmp, path)
}
