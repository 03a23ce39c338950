use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::resource::{Resource, or_dash};
use crate::core::schema::{FieldKind, FieldSpec, FilterField, FormSchema};
use crate::model::reference::{NamedRef, ref_name};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Batch {
    pub id: i64,
    pub name: String,

    #[serde(default)]
    pub course: Option<NamedRef>,

    #[serde(default)]
    pub branch: Option<NamedRef>,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub seats: Option<u32>,

    #[serde(default)]
    pub enrolled: Option<u32>,

    #[serde(default)]
    pub status: Option<String>,
}

impl Batch {
    pub fn seats_left(&self) -> Option<u32> {
        self.seats
            .map(|seats| seats.saturating_sub(self.enrolled.unwrap_or(0)))
    }
}

impl Resource for Batch {
    const ENDPOINT: &'static str = "admin/batches";
    const LIST_KEY: &'static str = "batches";
    const TAG: &'static str = "batches";
    const DEPENDENT_TAGS: &'static [&'static str] = &["courses"];
    const LABEL: &'static str = "batches";

    fn id(&self) -> i64 {
        self.id
    }

    fn filters() -> Vec<FilterField> {
        vec![
            FilterField::search(),
            FilterField::sort_order(),
            FilterField::select("course_id", "courses"),
            FilterField::select("branch_id", "branches"),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Course", "Branch", "Starts", "Seats left", "Status"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            ref_name(&self.course),
            ref_name(&self.branch),
            or_dash(&self.start_date),
            or_dash(&self.seats_left()),
            or_dash(&self.status),
        ]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("name", "Name").required().max_len(120),
            FieldSpec::new("course_id", "Course", FieldKind::Select).required(),
            FieldSpec::new("branch_id", "Branch", FieldKind::Select).required(),
            FieldSpec::new("start_date", "Start date", FieldKind::Date).required(),
            FieldSpec::new("end_date", "End date", FieldKind::Date),
            FieldSpec::new("seats", "Seats", FieldKind::Number),
        ])
    }
}
