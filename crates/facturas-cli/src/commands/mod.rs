//! Command implementations and the settings they share.

pub mod browse;
pub mod config;
pub mod pass;
pub mod watch;

use std::path::PathBuf;

use console::style;
use tracing::debug;

use facturas_core::loader::LoadReport;
use facturas_core::models::config::FacturasConfig;
use facturas_core::storage::SqliteStore;

/// Global options every command sees.
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub invoice_dir: Option<PathBuf>,
    pub database: Option<PathBuf>,
}

pub fn open_store(config: &FacturasConfig) -> anyhow::Result<SqliteStore> {
    Ok(SqliteStore::open(&config.storage.database)?)
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("facturas")
        .join("config.json")
}

impl Context {
    /// The config file commands read and write.
    pub fn config_file(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(default_config_path)
    }

    /// Configuration from the file (defaults if the default file is absent),
    /// with command-line overrides applied.
    pub fn load_config(&self) -> anyhow::Result<FacturasConfig> {
        let path = self.config_file();
        let mut config = if self.config_path.is_some() || path.exists() {
            debug!("Loading configuration from {}", path.display());
            FacturasConfig::from_file(&path)?
        } else {
            FacturasConfig::default()
        };

        if let Some(dir) = &self.invoice_dir {
            config.paths.invoice_dir = dir.clone();
        }
        if let Some(db) = &self.database {
            config.storage.database = db.clone();
        }
        Ok(config)
    }
}

pub fn print_load_report(report: &LoadReport) {
    let inv = &report.invoices;
    let lines = &report.charge_lines;

    println!(
        "{} Invoices: {} inserted, {} already stored",
        style("✓").green(),
        style(inv.inserted).bold(),
        inv.existing
    );
    if inv.rejected > 0 {
        println!("{} {} invoice rows rejected", style("⚠").yellow(), inv.rejected);
        for rejection in &report.rejections {
            println!("    {}", rejection);
        }
    }
    if inv.collisions > 0 {
        println!(
            "{} {} invoice rows share a key with another file (run 'facturas keys')",
            style("⚠").yellow(),
            inv.collisions
        );
    }

    println!(
        "{} Charge lines: {} inserted, {} already stored",
        style("✓").green(),
        style(lines.inserted).bold(),
        lines.existing
    );
    if lines.orphaned > 0 || lines.blank > 0 {
        println!(
            "{} {} without a stored invoice, {} with a blank concept",
            style("ℹ").blue(),
            lines.orphaned,
            lines.blank
        );
    }
}
