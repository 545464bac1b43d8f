use crate::core::Storage;
use crate::domain::model::CSV_HEADER;
use crate::utils::error::Result;
use std::collections::HashSet;

const NAME_COLUMN: &str = CSV_HEADER[0];

/// Normalized names already present in the master CSV.
///
/// Grows monotonically for the duration of a run: the sink inserts each name
/// right after its row is written so later places in the same run see it.
#[derive(Debug, Clone, Default)]
pub struct ExistingNameSet {
    names: HashSet<String>,
    needs_header: bool,
    needs_line_break: bool,
}

impl ExistingNameSet {
    /// Lowercased, trimmed form used as the dedup key.
    pub fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Builds the set from whatever is stored at `path`. An absent or empty
    /// store yields an empty set that asks the sink for a header row.
    pub async fn load<S: Storage>(storage: &S, path: &str) -> Result<Self> {
        let set = match storage.read_file(path).await? {
            Some(data) => Self::from_csv_bytes(&data),
            None => {
                tracing::debug!("No existing store at {}, starting fresh", path);
                Self::empty_store()
            }
        };

        tracing::info!(
            "📇 Loaded {} existing business names from {}",
            set.len(),
            path
        );
        Ok(set)
    }

    pub fn empty_store() -> Self {
        Self {
            names: HashSet::new(),
            needs_header: true,
            needs_line_break: false,
        }
    }

    /// Header-aware parse. Rows that cannot be read or that carry no name are
    /// skipped. Names in a legacy encoding are decoded lossily rather than
    /// dropped.
    pub fn from_csv_bytes(data: &[u8]) -> Self {
        if data.is_empty() {
            return Self::empty_store();
        }

        let mut set = Self {
            names: HashSet::new(),
            needs_header: false,
            needs_line_break: !matches!(data.last(), Some(b'\n' | b'\r')),
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data);

        let name_idx = match reader.byte_headers() {
            Ok(headers) => headers.iter().position(|h| {
                String::from_utf8_lossy(h)
                    .trim_start_matches('\u{feff}')
                    .trim()
                    == NAME_COLUMN
            }),
            Err(e) => {
                tracing::warn!("Could not read header of existing store: {}", e);
                None
            }
        };

        let Some(name_idx) = name_idx else {
            tracing::warn!("Existing store has no '{}' column, dedup disabled", NAME_COLUMN);
            return set;
        };

        for (line, row) in reader.byte_records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::debug!("Skipping malformed row {}: {}", line + 2, e);
                    continue;
                }
            };

            let Some(name) = row.get(name_idx).map(String::from_utf8_lossy) else {
                continue;
            };
            if !name.trim().is_empty() {
                set.names.insert(Self::normalize(&name));
            }
        }

        set
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&Self::normalize(name))
    }

    /// Returns `false` if the name was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        self.names.insert(Self::normalize(name))
    }

    pub fn needs_header(&self) -> bool {
        self.needs_header
    }

    /// True when the stored data ends mid-line, so the next write must start
    /// on a fresh line.
    pub fn needs_line_break(&self) -> bool {
        self.needs_line_break
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
