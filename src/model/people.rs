use serde::{Deserialize, Serialize};

use crate::core::resource::{Resource, or_dash, yes_no};
use crate::core::schema::{FieldKind, FieldSpec, FilterField, FormSchema};
use crate::model::reference::{NamedRef, ref_name, ref_names};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub student_id: Option<String>,

    #[serde(default)]
    pub branch: Option<NamedRef>,

    #[serde(default)]
    pub avatar: Option<String>,

    #[serde(default)]
    pub is_active: bool,
}

impl Resource for Student {
    const ENDPOINT: &'static str = "admin/students";
    const LIST_KEY: &'static str = "students";
    const TAG: &'static str = "students";
    const DEPENDENT_TAGS: &'static [&'static str] = &["stats"];
    const LABEL: &'static str = "students";

    fn id(&self) -> i64 {
        self.id
    }

    fn filters() -> Vec<FilterField> {
        vec![
            FilterField::search(),
            FilterField::sort_order(),
            FilterField::select("branch_id", "branches"),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Student ID", "Name", "Email", "Phone", "Branch", "Active"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            or_dash(&self.student_id),
            self.name.clone(),
            self.email.clone(),
            or_dash(&self.phone),
            ref_name(&self.branch),
            yes_no(self.is_active),
        ]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("name", "Name").required().max_len(120),
            FieldSpec::new("email", "Email", FieldKind::Email).required(),
            FieldSpec::new("phone", "Phone", FieldKind::Phone).required(),
            FieldSpec::new("branch_id", "Branch", FieldKind::Select),
            FieldSpec::new("avatar", "Photo", FieldKind::File),
            FieldSpec::new("is_active", "Active", FieldKind::Boolean),
        ])
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Teacher {
    pub id: i64,
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub designation: Option<String>,

    #[serde(default)]
    pub bio: Option<String>,

    #[serde(default)]
    pub avatar: Option<String>,

    #[serde(default)]
    pub branches: Vec<NamedRef>,
}

impl Resource for Teacher {
    const ENDPOINT: &'static str = "admin/teachers";
    const PUBLIC_ENDPOINT: Option<&'static str> = Some("teachers");
    const LIST_KEY: &'static str = "teachers";
    const TAG: &'static str = "teachers";
    const DEPENDENT_TAGS: &'static [&'static str] = &["home"];
    const LABEL: &'static str = "teachers";

    fn id(&self) -> i64 {
        self.id
    }

    fn filters() -> Vec<FilterField> {
        vec![
            FilterField::search(),
            FilterField::sort_order(),
            FilterField::select("branch_id", "branches"),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Designation", "Email", "Branches"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            or_dash(&self.designation),
            or_dash(&self.email),
            ref_names(&self.branches),
        ]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("name", "Name").required().max_len(120),
            FieldSpec::new("email", "Email", FieldKind::Email),
            FieldSpec::new("phone", "Phone", FieldKind::Phone),
            FieldSpec::text("designation", "Designation").max_len(120),
            FieldSpec::new("bio", "Bio", FieldKind::TextArea),
            FieldSpec::new("branch_ids", "Branches", FieldKind::MultiSelect),
            FieldSpec::new("avatar", "Photo", FieldKind::File),
        ])
    }
}
