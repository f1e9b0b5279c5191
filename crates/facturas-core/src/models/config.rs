//! Configuration structures for the extraction and loading pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FacturasError, Result};

/// Main configuration for the facturas pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FacturasConfig {
    /// Source and intermediate file locations.
    pub paths: PathsConfig,

    /// Field extraction tuning.
    pub extraction: ExtractionConfig,

    /// Persistent storage configuration.
    pub storage: StorageConfig,

    /// Poll loop configuration.
    pub watch: WatchConfig,
}

/// Where invoices and intermediate files live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the source PDF invoices.
    pub invoice_dir: PathBuf,

    /// Name of the concatenated text dump inside `invoice_dir`.
    pub text_dump: String,

    /// Name of the invoice-level CSV inside `invoice_dir`.
    pub general_csv: String,

    /// Name of the itemized CSV inside `invoice_dir`.
    pub items_csv: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            invoice_dir: PathBuf::from("Facturas"),
            text_dump: "resultado.txt".to_string(),
            general_csv: "datos_generales.csv".to_string(),
            items_csv: "datos_especificos.csv".to_string(),
        }
    }
}

impl PathsConfig {
    pub fn text_dump_path(&self) -> PathBuf {
        self.invoice_dir.join(&self.text_dump)
    }

    pub fn general_csv_path(&self) -> PathBuf {
        self.invoice_dir.join(&self.general_csv)
    }

    pub fn items_csv_path(&self) -> PathBuf {
        self.invoice_dir.join(&self.items_csv)
    }
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Words that disqualify a header line from being the payer name.
    /// Matched as case-insensitive substrings.
    pub name_stop_words: Vec<String>,

    /// Payer names are cut to this many words before storage.
    pub stored_name_words: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            name_stop_words: default_stop_words(),
            stored_name_words: 2,
        }
    }
}

/// Label and address words seen on the header of the supported invoice layout.
pub fn default_stop_words() -> Vec<String> {
    [
        "AL DÍA", "FECHA", "PAGO", "SUSPENCIÓN", "INMEDIATO", "NO HAY NADA", "IMPORTE",
        "VALOR", "DIRECCI", "LOCALIDAD", "ASUNTO", "CARTAGENA", "ESTIMADO", "CONEXION",
        "RESIDENCIAL", "ESTRATO", "KR", "CL", "BOTERO", "SAN ROQUE", "SINCELEJO", "CREDITO",
        "OTROS", "CONSUMO", "RECUPERADO", "FACTURADO", "MES", "PRO", "SEGURIDAD", "VIDA",
        "SUBSIDIO", "INTERES", "BRILLA", "PLUS", "UNIDAD", "CLIENTE", "DIRECCIYN",
        "RECUPERACI", "PERIODOS", "ANTERIORES", "USUARIO", "FACTURA", "ANEXA", "COMUNICACI",
        "INVESTIGACI", "FACTURACIYN", "KIT", "NOMBRE", "CONTRATO", "TOTAL",
    ]
    .iter()
    .map(|w| w.to_string())
    .collect()
}

/// Persistent storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file.
    pub database: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("facturas.db"),
        }
    }
}

/// Poll loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Seconds between directory scans.
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

impl FacturasConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FacturasError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| FacturasError::Config(format!("invalid {}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| FacturasError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
