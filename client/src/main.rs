use anyhow::{Context, Result};
use household_ledger::config::ConfigManager;
use household_ledger::session::{FileStore, Session};
use household_ledger::stat::ApiClient;
use household_ledger::tui::{self, App};
use household_ledger::utils::{app_data_dir, init_tracing};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let data_dir = app_data_dir();
    init_tracing(&data_dir);

    let manager = ConfigManager::new(data_dir.clone());
    let config = manager
        .load()
        .with_context(|| format!("reading {}", manager.config_path().display()))?;
    if !manager.config_path().exists() {
        manager.save(&config)?;
    }

    let session = Session::load(Box::new(FileStore::in_dir(&data_dir)));
    let api = ApiClient::new(config.api_base_url.clone());
    let export_dir = manager.export_dir(&config);
    tracing::info!(
        api = %api.base_url(),
        signed_in = session.is_signed_in(),
        "starting household ledger"
    );

    let app = App::new(api, session, config, export_dir);
    tui::run_tui(app)?;
    Ok(())
}
