use serde::{Deserialize, Serialize};

use crate::core::resource::{Resource, or_dash, yes_no};
use crate::core::schema::{FieldKind, FieldSpec, FilterField, FormSchema};
use crate::model::reference::{NamedRef, ref_name};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: i64,
    pub title: String,

    #[serde(default)]
    pub course: Option<NamedRef>,

    #[serde(default)]
    pub position: Option<u32>,

    #[serde(default)]
    pub lessons_count: Option<u32>,
}

impl Resource for Chapter {
    const ENDPOINT: &'static str = "admin/chapters";
    const LIST_KEY: &'static str = "chapters";
    const TAG: &'static str = "chapters";
    const DEPENDENT_TAGS: &'static [&'static str] = &["lessons"];
    const LABEL: &'static str = "chapters";

    fn id(&self) -> i64 {
        self.id
    }

    fn filters() -> Vec<FilterField> {
        vec![
            FilterField::search(),
            FilterField::sort_order(),
            FilterField::select("course_id", "courses"),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Title", "Course", "Position", "Lessons"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            ref_name(&self.course),
            or_dash(&self.position),
            or_dash(&self.lessons_count),
        ]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("title", "Title").required().max_len(255),
            FieldSpec::new("course_id", "Course", FieldKind::Select).required(),
            FieldSpec::new("position", "Position", FieldKind::Number),
        ])
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Lesson {
    pub id: i64,
    pub title: String,

    #[serde(default)]
    pub chapter: Option<NamedRef>,

    #[serde(default)]
    pub video_url: Option<String>,

    #[serde(default)]
    pub duration_minutes: Option<u32>,

    #[serde(default)]
    pub is_free: bool,

    #[serde(default)]
    pub position: Option<u32>,
}

impl Resource for Lesson {
    const ENDPOINT: &'static str = "admin/lessons";
    const LIST_KEY: &'static str = "lessons";
    const TAG: &'static str = "lessons";
    const DEPENDENT_TAGS: &'static [&'static str] = &["chapters"];
    const LABEL: &'static str = "lessons";

    fn id(&self) -> i64 {
        self.id
    }

    fn filters() -> Vec<FilterField> {
        vec![
            FilterField::search(),
            FilterField::sort_order(),
            FilterField::select("chapter_id", "chapters"),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Title", "Chapter", "Minutes", "Free"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            ref_name(&self.chapter),
            or_dash(&self.duration_minutes),
            yes_no(self.is_free),
        ]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("title", "Title").required().max_len(255),
            FieldSpec::new("chapter_id", "Chapter", FieldKind::Select).required(),
            FieldSpec::text("video_url", "Video URL").max_len(2048),
            FieldSpec::new("duration_minutes", "Duration (minutes)", FieldKind::Number),
            FieldSpec::new("attachment", "Attachment", FieldKind::File),
            FieldSpec::new("is_free", "Free preview", FieldKind::Boolean),
        ])
    }
}
