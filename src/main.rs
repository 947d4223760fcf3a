use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use shortcut_manager::actions::{Action, ActionCatalog, CatalogLoader};
use shortcut_manager::config::{self, Config};
use shortcut_manager::error::{Error, ErrorSeverity};
use shortcut_manager::logging;
use shortcut_manager::shortcuts::{
    JsonFileStore, KeyValueStore, Platform, PreferenceStore, Shortcut, ShortcutCodec,
    ShortcutEditor,
};

mod cli;

use cli::{Cli, Command};

/// Definitions used when neither the command line nor the config names a file.
const BUNDLED_ACTIONS: &str = include_str!("../assets/actions.xml");

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = logging::init(cli.log_dir.as_deref());

    let config = config::load_config(cli.config.as_deref());
    let platform = if cli.mac {
        Platform::Mac
    } else if cli.pc {
        Platform::Other
    } else {
        config.get_platform()
    };
    let codec = ShortcutCodec::new(platform);

    match run(cli, &config, codec) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<Error>() {
                Some(err) => {
                    log_failure(err);
                    eprintln!("{}", err.user_message(codec.platform()));
                }
                None => {
                    error!(error = ?e, "Command failed");
                    eprintln!("error: {:#}", e);
                }
            }
            ExitCode::FAILURE
        }
    }
}

/// Log a failed command at the level its severity calls for.
fn log_failure(err: &Error) {
    match err.severity() {
        ErrorSeverity::Info => info!(error = %err, "Command refused"),
        ErrorSeverity::Warning => warn!(error = %err, "Command rejected"),
        ErrorSeverity::Error | ErrorSeverity::Critical => {
            error!(severity = ?err.severity(), error = %err, "Command failed")
        }
    }
}

fn run(cli: Cli, config: &Config, codec: ShortcutCodec) -> Result<()> {
    // Rendering needs no catalog or store.
    if let Command::Render { form } = &cli.command {
        let shortcut = codec.decode_internal(&form.join(" ")).map_err(Error::from)?;
        println!("{}", codec.render(&shortcut));
        return Ok(());
    }

    let catalog = load_catalog(&cli, config, codec.platform())?;
    let store_path = cli.store.clone().unwrap_or_else(|| config.get_store_path());
    let backend = JsonFileStore::open(&store_path).map_err(Error::from)?;
    let mut store =
        PreferenceStore::new(config.namespace.clone(), backend, catalog).map_err(Error::from)?;

    store.subscribe(|action: &Action, previous: Option<&Shortcut>| {
        logging::log_shortcut_event(
            &action.id(),
            previous.map(Shortcut::internal_form),
            action.shortcut.as_ref().map(Shortcut::internal_form),
        );
    });
    store.init(false).map_err(Error::from)?;
    info!(
        namespace = %store.namespace(),
        store = %store_path.display(),
        actions = store.catalog().len(),
        "Preferences reconciled"
    );

    let mut editor = ShortcutEditor::new(&mut store, codec);
    match cli.command {
        Command::List => print_rows(&editor),
        Command::Set { id, masks, keys } => {
            let shortcut = codec.decode_external(&masks, &keys).map_err(Error::from)?;
            let action = editor.assign(&id, Some(shortcut)).map_err(Error::from)?;
            println!("{}: {}", id, codec.render_optional(action.shortcut.as_ref()));
        }
        Command::Clear { id } => {
            editor.clear(&id).map_err(Error::from)?;
            println!("{}: cleared", id);
        }
        Command::Reset => {
            editor.restore_defaults().map_err(Error::from)?;
            println!("All shortcuts restored to defaults");
        }
        Command::Render { .. } => {}
    }
    Ok(())
}

fn load_catalog(cli: &Cli, config: &Config, platform: Platform) -> Result<ActionCatalog> {
    let loader = CatalogLoader::new(platform, config.get_os_name());
    let path = cli.actions.clone().or_else(|| config.get_actions_path());
    let catalog = match path {
        Some(path) => loader
            .load_path(&path)
            .map_err(Error::from)
            .with_context(|| format!("loading actions from {}", path.display()))?,
        None => loader.load_str(BUNDLED_ACTIONS).map_err(Error::from)?,
    };
    Ok(catalog)
}

fn print_rows<S: KeyValueStore>(editor: &ShortcutEditor<'_, S>) {
    let rows = editor.rows();
    let id_width = rows.iter().map(|r| r.id.len()).max().unwrap_or(0).max(2);
    let label_width = rows.iter().map(|r| r.label.len()).max().unwrap_or(0).max(5);
    println!(
        "{:<id_width$}  {:<label_width$}  {:<16}  DEFAULT",
        "ID", "LABEL", "SHORTCUT"
    );
    for row in rows {
        println!(
            "{:<id_width$}  {:<label_width$}  {:<16}  {}",
            row.id, row.label, row.current, row.default
        );
    }
}
