use std::collections::BTreeMap;

use log::warn;
use url::Url;

use crate::core::portal::Portal;
use crate::core::resource::Resource;
use crate::model::envelope::{ApiOutcome, Page, Pagination};

/// Page and filters as read from the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    /// `None` for absent, empty or repeated parameters.
    pub filters: BTreeMap<String, Option<String>>,
}

impl ListParams {
    pub fn from_url(url: &Url, keys: &[&str]) -> Self {
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let single = |key: &str| -> Option<String> {
            let mut values = pairs.iter().filter(|(k, _)| k == key).map(|(_, v)| v);
            match (values.next(), values.next()) {
                (Some(value), None) if !value.is_empty() => Some(value.clone()),
                _ => None,
            }
        };

        let page = single("page")
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);

        let filters = keys
            .iter()
            .map(|key| (key.to_string(), single(key)))
            .collect();

        Self { page, filters }
    }

    pub fn for_resource<R: Resource>(url: &Url) -> Self {
        let keys: Vec<&str> = R::filters().iter().map(|f| f.key).collect();
        Self::from_url(url, &keys)
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).and_then(|v| v.as_deref())
    }

    pub fn to_query(&self, per_page: u32) -> ListQuery {
        let mut query = ListQuery::new(self.page, per_page);
        for (key, value) in &self.filters {
            if let Some(value) = value {
                query = query.filter(key, value);
            }
        }
        query
    }
}

/// What goes on the wire for a list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page,
            filters: BTreeMap::new(),
        }
    }

    pub fn filter(mut self, key: &str, value: &str) -> Self {
        self.filters.insert(key.to_string(), value.to_string());
        self
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("per_page".to_string(), self.per_page.to_string()),
        ];
        pairs.extend(
            self.filters
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        pairs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListOutcome<R> {
    Error { message: String },
    Empty,
    Success { rows: Vec<R>, pagination: Pagination },
}

impl<R: Resource> ListOutcome<R> {
    pub fn from_result(result: crate::error::Result<ApiOutcome<Page<R>>>) -> Self {
        match result {
            Err(err) => ListOutcome::Error {
                message: err.to_string(),
            },
            Ok(ApiOutcome::Failure { message, .. }) => ListOutcome::Error { message },
            Ok(ApiOutcome::NotFound { .. }) => ListOutcome::Empty,
            Ok(ApiOutcome::Success { data, .. }) if data.rows.is_empty() => ListOutcome::Empty,
            Ok(ApiOutcome::Success { data, .. }) => ListOutcome::Success {
                rows: data.rows,
                pagination: data.pagination,
            },
        }
    }

    /// Exactly one panel: error, not-found, or table plus pagination.
    pub fn render(&self) -> String {
        match self {
            ListOutcome::Error { message } => format!("Something went wrong\n{message}\n"),
            ListOutcome::Empty => format!("No {} found\n", R::LABEL),
            ListOutcome::Success { rows, pagination } => {
                let cells: Vec<Vec<String>> = rows.iter().map(R::cells).collect();
                let mut out = render_table(R::columns(), &cells);
                out.push_str(&pagination.summary());
                out.push('\n');
                out
            }
        }
    }
}

fn render_table(columns: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&table_line(columns, &widths));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&table_line(&cells, &widths));
        out.push('\n');
    }
    out
}

fn table_line(cells: &[&str], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    padded.join(" | ").trim_end().to_string()
}

/// Fetches one page of a resource and turns it into a `ListOutcome`.
pub struct ListFetcher<'a> {
    portal: &'a Portal,
    per_page: u32,
    public: bool,
}

impl<'a> ListFetcher<'a> {
    pub fn new(portal: &'a Portal) -> Self {
        Self {
            portal,
            per_page: portal.config().default_per_page,
            public: false,
        }
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Use the resource's unauthenticated listing.
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub async fn fetch<R: Resource>(&self, params: &ListParams) -> ListOutcome<R> {
        let query = params.to_query(self.per_page);
        let result = if self.public {
            self.portal.list_public::<R>(&query).await
        } else {
            self.portal.list::<R>(&query).await
        };
        if let Err(err) = &result {
            warn!("listing {} failed: {err}", R::LABEL);
        }
        ListOutcome::from_result(result)
    }

    pub async fn fetch_url<R: Resource>(&self, url: &Url) -> ListOutcome<R> {
        self.fetch::<R>(&ListParams::for_resource::<R>(url)).await
    }
}
