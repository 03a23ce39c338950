use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::resource::{Resource, or_dash, yes_no};
use crate::core::schema::{FieldKind, FieldSpec, FilterField, FormSchema};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HeroSection {
    pub id: i64,
    pub title: String,

    #[serde(default)]
    pub subtitle: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub button_text: Option<String>,

    #[serde(default)]
    pub button_link: Option<String>,

    #[serde(default)]
    pub is_active: bool,
}

impl Resource for HeroSection {
    const ENDPOINT: &'static str = "admin/hero-sections";
    const PUBLIC_ENDPOINT: Option<&'static str> = Some("hero-sections");
    const LIST_KEY: &'static str = "hero_sections";
    const TAG: &'static str = "hero-sections";
    const DEPENDENT_TAGS: &'static [&'static str] = &["home"];
    const LABEL: &'static str = "hero sections";

    fn id(&self) -> i64 {
        self.id
    }

    fn filters() -> Vec<FilterField> {
        vec![FilterField::search()]
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Title", "Button", "Active"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            or_dash(&self.button_text),
            yes_no(self.is_active),
        ]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("title", "Title").required().max_len(255),
            FieldSpec::text("subtitle", "Subtitle").max_len(500),
            FieldSpec::new("image", "Image", FieldKind::File).required(),
            FieldSpec::text("button_text", "Button text").max_len(60),
            FieldSpec::text("button_link", "Button link").max_len(2048),
            FieldSpec::new("is_active", "Active", FieldKind::Boolean),
        ])
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewsFeed {
    pub id: i64,
    pub title: String,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Resource for NewsFeed {
    const ENDPOINT: &'static str = "admin/news-feeds";
    const PUBLIC_ENDPOINT: Option<&'static str> = Some("news-feeds");
    const LIST_KEY: &'static str = "news_feeds";
    const TAG: &'static str = "news-feeds";
    const DEPENDENT_TAGS: &'static [&'static str] = &["home"];
    const LABEL: &'static str = "news";

    fn id(&self) -> i64 {
        self.id
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Title", "Published"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.published_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("title", "Title").required().max_len(255),
            FieldSpec::new("body", "Body", FieldKind::TextArea).required(),
            FieldSpec::new("image", "Image", FieldKind::File),
        ])
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Partner {
    pub id: i64,
    pub name: String,

    #[serde(default)]
    pub logo: Option<String>,

    #[serde(default)]
    pub website: Option<String>,
}

impl Resource for Partner {
    const ENDPOINT: &'static str = "admin/partners";
    const PUBLIC_ENDPOINT: Option<&'static str> = Some("partners");
    const LIST_KEY: &'static str = "partners";
    const TAG: &'static str = "partners";
    const DEPENDENT_TAGS: &'static [&'static str] = &["home"];
    const LABEL: &'static str = "partners";

    fn id(&self) -> i64 {
        self.id
    }

    fn filters() -> Vec<FilterField> {
        vec![FilterField::search()]
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Website"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), or_dash(&self.website)]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("name", "Name").required().max_len(120),
            FieldSpec::new("logo", "Logo", FieldKind::File).required(),
            FieldSpec::text("website", "Website").max_len(2048),
        ])
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Opportunity {
    pub id: i64,
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub icon: Option<String>,
}

impl Resource for Opportunity {
    const ENDPOINT: &'static str = "admin/opportunities";
    const PUBLIC_ENDPOINT: Option<&'static str> = Some("opportunities");
    const LIST_KEY: &'static str = "opportunities";
    const TAG: &'static str = "opportunities";
    const DEPENDENT_TAGS: &'static [&'static str] = &["home"];
    const LABEL: &'static str = "opportunities";

    fn id(&self) -> i64 {
        self.id
    }

    fn filters() -> Vec<FilterField> {
        vec![FilterField::search()]
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Title"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.title.clone()]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("title", "Title").required().max_len(255),
            FieldSpec::new("description", "Description", FieldKind::TextArea),
            FieldSpec::new("icon", "Icon", FieldKind::File),
        ])
    }
}

/// Counters shown on the home page and the admin dashboard.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Stats {
    #[serde(default)]
    pub students: u64,
    #[serde(default)]
    pub courses: u64,
    #[serde(default)]
    pub teachers: u64,
    #[serde(default)]
    pub branches: u64,
    #[serde(default)]
    pub enrollments: u64,
}
