//! Raw data table paging

use serde::{Deserialize, Serialize};

use crate::config::defaults::PAGE_SIZE_OPTIONS;
use crate::types::NormalizedDataset;

/// Rows per page offered by the data table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum PageSize {
    Fifty,
    Hundred,
    TwoHundred,
}

impl PageSize {
    pub fn rows(self) -> usize {
        match self {
            PageSize::Fifty => PAGE_SIZE_OPTIONS[0],
            PageSize::Hundred => PAGE_SIZE_OPTIONS[1],
            PageSize::TwoHundred => PAGE_SIZE_OPTIONS[2],
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Hundred
    }
}

impl TryFrom<usize> for PageSize {
    type Error = String;

    fn try_from(rows: usize) -> Result<Self, Self::Error> {
        [PageSize::Fifty, PageSize::Hundred, PageSize::TwoHundred]
            .into_iter()
            .find(|p| p.rows() == rows)
            .ok_or_else(|| format!("page size {rows} must be one of {PAGE_SIZE_OPTIONS:?}"))
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> Self {
        size.rows()
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.rows())
    }
}

/// One page of row indices, `start..end` into the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    /// 1-indexed page actually shown, after clamping
    pub page: usize,
    pub page_size: PageSize,
    pub total_rows: usize,
    pub total_pages: usize,
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Compute the row window for a requested page.
///
/// `total_pages = ceil(total_rows / page_size)`. Requests outside
/// `1..=max(total_pages, 1)` are clamped into range.
pub fn paginate(total_rows: usize, page_size: PageSize, page: usize) -> PageWindow {
    let size = page_size.rows();
    let total_pages = total_rows.div_ceil(size);
    let page = page.clamp(1, total_pages.max(1));
    let start = ((page - 1) * size).min(total_rows);
    let end = (start + size).min(total_rows);

    PageWindow {
        page,
        page_size,
        total_rows,
        total_pages,
        start,
        end,
    }
}

/// Rendered page of the raw data table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePage {
    pub window: PageWindow,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Header of the combined timestamp column
pub const TIMESTAMP_COLUMN: &str = "Timestamp";
/// Header of the derived utilization column
pub const DERIVED_UTILIZATION_COLUMN: &str = "Screen Utilization (%) [derived]";
/// Header of the derived solids volume rate column
pub const DERIVED_SOLIDS_COLUMN: &str = "Solids Volume Rate (gpm) [derived]";

/// Render one page of rows: every uploaded column, then the derived columns
/// the dataset carries (timestamp when built from split fields, derived
/// utilization and solids volume rate).
pub fn table_page(dataset: &NormalizedDataset, page_size: PageSize, page: usize) -> TablePage {
    use crate::types::{TimestampStatus, UtilizationSource};

    let window = paginate(dataset.len(), page_size, page);

    let show_timestamp = matches!(dataset.timestamp_status(), TimestampStatus::Combined { .. });
    let show_derived = matches!(
        dataset.utilization_source(),
        UtilizationSource::Derived { .. }
    );

    let mut columns = dataset.headers().to_vec();
    if show_timestamp {
        columns.push(TIMESTAMP_COLUMN.to_string());
    }
    if show_derived {
        columns.push(DERIVED_UTILIZATION_COLUMN.to_string());
        columns.push(DERIVED_SOLIDS_COLUMN.to_string());
    }

    let fmt_opt = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_default();

    let rows = dataset.records()[window.start..window.end]
        .iter()
        .map(|rec| {
            let mut cells: Vec<String> = (0..dataset.headers().len())
                .map(|i| rec.raw.text(i).unwrap_or_default())
                .collect();
            if show_timestamp {
                cells.push(
                    rec.timestamp
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_default(),
                );
            }
            if show_derived {
                cells.push(fmt_opt(rec.screen_utilization_pct));
                cells.push(fmt_opt(rec.solids_volume_rate));
            }
            cells
        })
        .collect();

    TablePage {
        window,
        columns,
        rows,
    }
}
