use crate::core::index::ExistingNameSet;
use crate::core::Storage;
use crate::domain::model::BusinessRecord;
use crate::utils::error::{LeadError, Result};

/// Appends accepted records to the master CSV.
pub struct CsvSink<S: Storage> {
    storage: S,
    path: String,
    header_pending: bool,
    line_break_pending: bool,
}

impl<S: Storage> CsvSink<S> {
    pub fn new(storage: S, path: impl Into<String>, names: &ExistingNameSet) -> Self {
        Self {
            storage,
            path: path.into(),
            header_pending: names.needs_header(),
            line_break_pending: names.needs_line_break(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Writes one row (preceded by the header on the first write to an empty
    /// store) and then records the name in `names`.
    pub async fn append(
        &mut self,
        record: &BusinessRecord,
        names: &mut ExistingNameSet,
    ) -> Result<()> {
        let mut data = Vec::new();
        if self.line_break_pending {
            // 既有檔案最後一行沒有換行
            data.push(b'\n');
        }
        data.extend(encode_row(record, self.header_pending)?);
        self.storage.append_file(&self.path, &data).await?;

        self.line_break_pending = false;
        if self.header_pending {
            tracing::debug!("Wrote header row to {}", self.path);
            self.header_pending = false;
        }
        names.insert(&record.name);

        tracing::info!("💾 Saved {} <{}>", record.name, record.email);
        Ok(())
    }
}

/// Header names come from the record's serde renames; missing values are
/// written as empty cells.
fn encode_row(record: &BusinessRecord, with_header: bool) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());

    writer.serialize(record)?;

    writer
        .into_inner()
        .map_err(|e| LeadError::IoError(e.into_error()))
}
