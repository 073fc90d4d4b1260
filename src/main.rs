use anyhow::Context;
use log::info;

use pim_sqlite::{Config, Database, ItemFilter};

/// Opens the configured database, brings the schema up to date and prints
/// the current profile and schedule as JSON.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    let db = Database::from_config(&config)
        .with_context(|| format!("cannot open {}", config.db_path.display()))?;
    info!("database ready at {}", config.db_path.display());

    let profile = db.profiles().get_profile_json(config.user_id)?;
    println!("profile: {profile}");

    let schedule = db.schedule();
    for label in schedule.list_item_labels(config.user_id)? {
        println!("  {label}");
    }
    println!("items: {}", schedule.list_items_json(config.user_id, ItemFilter::All)?);

    log::debug!("metrics:\n{}", pim_sqlite::gather_metrics());
    db.close()?;
    Ok(())
}
