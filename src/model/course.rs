use serde::{Deserialize, Serialize};

use crate::core::resource::{Resource, or_dash, yes_no};
use crate::core::schema::{FieldKind, FieldSpec, FilterField, FormSchema};
use crate::model::reference::{NamedRef, ref_names};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,

    #[serde(default)]
    pub slug: Option<String>,
}

impl Resource for Category {
    const ENDPOINT: &'static str = "admin/categories";
    const PUBLIC_ENDPOINT: Option<&'static str> = Some("categories");
    const LIST_KEY: &'static str = "categories";
    const TAG: &'static str = "categories";
    const DEPENDENT_TAGS: &'static [&'static str] = &["courses"];
    const LABEL: &'static str = "categories";

    fn id(&self) -> i64 {
        self.id
    }

    fn filters() -> Vec<FilterField> {
        vec![FilterField::search()]
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Slug"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), or_dash(&self.slug)]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("name", "Name").required().max_len(120),
            FieldSpec::text("slug", "Slug").max_len(120),
        ])
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Course {
    pub id: i64,
    pub title: String,

    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub category: Option<Category>,

    #[serde(default)]
    pub branches: Vec<NamedRef>,

    #[serde(default)]
    pub course_type: Option<String>,

    #[serde(default)]
    pub price: Option<f64>,

    #[serde(default)]
    pub discount_price: Option<f64>,

    #[serde(default)]
    pub duration: Option<String>,

    #[serde(default)]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub is_published: bool,
}

impl Course {
    /// Price a student pays, preferring the discount when there is one.
    pub fn effective_price(&self) -> Option<f64> {
        match (self.discount_price, self.price) {
            (Some(discount), Some(price)) if discount < price => Some(discount),
            (_, Some(price)) => Some(price),
            (discount, None) => discount,
        }
    }
}

impl Resource for Course {
    const ENDPOINT: &'static str = "admin/courses";
    const PUBLIC_ENDPOINT: Option<&'static str> = Some("courses");
    const LIST_KEY: &'static str = "courses";
    const TAG: &'static str = "courses";
    const DEPENDENT_TAGS: &'static [&'static str] = &["filter-options", "home"];
    const LABEL: &'static str = "courses";

    fn id(&self) -> i64 {
        self.id
    }

    fn filters() -> Vec<FilterField> {
        vec![
            FilterField::search(),
            FilterField::sort_order(),
            FilterField::select("category_id", "categories"),
            FilterField::select("branch_id", "branches"),
            FilterField::select("course_type", "course_types"),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Title", "Category", "Type", "Price", "Branches", "Published"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.category
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "-".to_string()),
            or_dash(&self.course_type),
            self.effective_price()
                .map(|p| format!("{p:.2}"))
                .unwrap_or_else(|| "-".to_string()),
            ref_names(&self.branches),
            yes_no(self.is_published),
        ]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("title", "Title").required().max_len(255),
            FieldSpec::text("slug", "Slug").max_len(255),
            FieldSpec::new("category_id", "Category", FieldKind::Select).required(),
            FieldSpec::new("branch_ids", "Branches", FieldKind::MultiSelect),
            FieldSpec::new("course_type", "Course type", FieldKind::Select).required(),
            FieldSpec::new("price", "Price", FieldKind::Number).required(),
            FieldSpec::new("discount_price", "Discount price", FieldKind::Number),
            FieldSpec::text("duration", "Duration").max_len(60),
            FieldSpec::new("thumbnail", "Thumbnail", FieldKind::File),
            FieldSpec::new("description", "Description", FieldKind::TextArea),
            FieldSpec::new("is_published", "Published", FieldKind::Boolean),
        ])
    }
}
