//! SQL schema for the epiwatch SQLite store.
//!
//! Table and column names match the extracts so the file can be read by
//! other tools without a mapping layer.

/// Connection-level settings, applied on every open.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS country (
    iso3    TEXT PRIMARY KEY NOT NULL,
    country TEXT NOT NULL,
    region  TEXT NOT NULL
            CHECK (region IN ('AFR', 'AMR', 'SEAR', 'EUR', 'EMR', 'WPR'))
);

-- One row per country and reporting month. `date` is always YYYY-MM-01.
CREATE TABLE IF NOT EXISTS case_data (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    country_iso3          TEXT NOT NULL REFERENCES country(iso3),
    date                  TEXT NOT NULL,
    measles_suspect       REAL NOT NULL DEFAULT 0,
    measles_clinical      REAL NOT NULL DEFAULT 0,
    measles_epi_linked    REAL NOT NULL DEFAULT 0,
    measles_lab_confirmed REAL NOT NULL DEFAULT 0,
    measles_total         REAL NOT NULL DEFAULT 0,
    rubella_clinical      REAL NOT NULL DEFAULT 0,
    rubella_epi_linked    REAL NOT NULL DEFAULT 0,
    rubella_lab_confirmed REAL NOT NULL DEFAULT 0,
    rubella_total         REAL NOT NULL DEFAULT 0,
    discarded             REAL NOT NULL DEFAULT 0
);

CREATE UNIQUE INDEX IF NOT EXISTS case_data_country_iso3_date
    ON case_data(country_iso3, date);
CREATE INDEX IF NOT EXISTS case_data_date_idx ON case_data(date);

PRAGMA user_version = 1;
";

pub const INSERT_COUNTRY: &str =
  "INSERT OR IGNORE INTO country (iso3, country, region) VALUES (?1, ?2, ?3)";

pub const INSERT_CASE: &str = "
INSERT OR IGNORE INTO case_data (
    country_iso3, date,
    measles_suspect, measles_clinical, measles_epi_linked,
    measles_lab_confirmed, measles_total,
    rubella_clinical, rubella_epi_linked, rubella_lab_confirmed,
    rubella_total, discarded
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

/// Column list shared by every `case_data` read; [`crate::encode::RawCase`]
/// decodes rows in this order.
pub const CASE_COLUMNS: &str = "
    c.country_iso3, c.date,
    c.measles_suspect, c.measles_clinical, c.measles_epi_linked,
    c.measles_lab_confirmed, c.measles_total,
    c.rubella_clinical, c.rubella_epi_linked, c.rubella_lab_confirmed,
    c.rubella_total, c.discarded";
