use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::resource::{Resource, or_dash};
use crate::core::schema::{FieldKind, FieldSpec, FilterField, FormSchema};
use crate::model::reference::{NamedRef, ref_name};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub slug: String,

    #[serde(default)]
    pub excerpt: Option<String>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub cover_image: Option<String>,

    #[serde(default)]
    pub author: Option<NamedRef>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Resource for BlogPost {
    const ENDPOINT: &'static str = "admin/blogs";
    const PUBLIC_ENDPOINT: Option<&'static str> = Some("blogs");
    const LIST_KEY: &'static str = "blogs";
    const TAG: &'static str = "blogs";
    const LABEL: &'static str = "blog posts";

    fn id(&self) -> i64 {
        self.id
    }

    fn filters() -> Vec<FilterField> {
        vec![
            FilterField::search(),
            FilterField::sort_order(),
            FilterField::select("tag", "tags"),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Title", "Author", "Tags", "Published"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            ref_name(&self.author),
            if self.tags.is_empty() {
                "-".to_string()
            } else {
                self.tags.join(", ")
            },
            self.published_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("title", "Title").required().max_len(255),
            FieldSpec::text("slug", "Slug").max_len(255),
            FieldSpec::text("excerpt", "Excerpt").max_len(500),
            FieldSpec::new("body", "Body", FieldKind::TextArea).required(),
            FieldSpec::new("cover_image", "Cover image", FieldKind::File),
            FieldSpec::new("tags", "Tags", FieldKind::MultiSelect),
        ])
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JobCircular {
    pub id: i64,
    pub title: String,

    #[serde(default)]
    pub organization: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub salary: Option<String>,

    #[serde(default)]
    pub deadline: Option<NaiveDate>,

    #[serde(default)]
    pub apply_link: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl Resource for JobCircular {
    const ENDPOINT: &'static str = "admin/job-circulars";
    const PUBLIC_ENDPOINT: Option<&'static str> = Some("job-circulars");
    const LIST_KEY: &'static str = "job_circulars";
    const TAG: &'static str = "job-circulars";
    const LABEL: &'static str = "job circulars";

    fn id(&self) -> i64 {
        self.id
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Title", "Organization", "Location", "Deadline"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            or_dash(&self.organization),
            or_dash(&self.location),
            or_dash(&self.deadline),
        ]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("title", "Title").required().max_len(255),
            FieldSpec::text("organization", "Organization").required().max_len(255),
            FieldSpec::text("location", "Location").max_len(255),
            FieldSpec::text("salary", "Salary").max_len(120),
            FieldSpec::new("deadline", "Deadline", FieldKind::Date),
            FieldSpec::text("apply_link", "Apply link").max_len(2048),
            FieldSpec::new("description", "Description", FieldKind::TextArea),
        ])
    }
}
