use serde::{Deserialize, Serialize};

use crate::core::resource::{Resource, or_dash, yes_no};
use crate::core::schema::{FieldKind, FieldSpec, FilterField, FormSchema};
use crate::model::reference::{NamedRef, ref_name};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Branch {
    pub id: i64,
    pub name: String,

    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub division: Option<NamedRef>,

    #[serde(default)]
    pub is_active: bool,
}

impl Resource for Branch {
    const ENDPOINT: &'static str = "admin/branches";
    const PUBLIC_ENDPOINT: Option<&'static str> = Some("branches");
    const LIST_KEY: &'static str = "branches";
    const TAG: &'static str = "branches";
    const DEPENDENT_TAGS: &'static [&'static str] = &["filter-options"];
    const LABEL: &'static str = "branches";

    fn id(&self) -> i64 {
        self.id
    }

    fn filters() -> Vec<FilterField> {
        vec![
            FilterField::search(),
            FilterField::sort_order(),
            FilterField::select("division_id", "divisions"),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Code", "Division", "Phone", "Active"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            or_dash(&self.code),
            ref_name(&self.division),
            or_dash(&self.phone),
            yes_no(self.is_active),
        ]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("name", "Name").required().max_len(255),
            FieldSpec::text("code", "Code").max_len(32),
            FieldSpec::new("division_id", "Division", FieldKind::Select).required(),
            FieldSpec::new("address", "Address", FieldKind::TextArea),
            FieldSpec::new("phone", "Phone", FieldKind::Phone),
            FieldSpec::new("is_active", "Active", FieldKind::Boolean),
        ])
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Division {
    pub id: i64,
    pub name: String,

    #[serde(default)]
    pub branches_count: Option<u32>,
}

impl Resource for Division {
    const ENDPOINT: &'static str = "admin/divisions";
    const PUBLIC_ENDPOINT: Option<&'static str> = Some("divisions");
    const LIST_KEY: &'static str = "divisions";
    const TAG: &'static str = "divisions";
    const DEPENDENT_TAGS: &'static [&'static str] = &["filter-options", "branches"];
    const LABEL: &'static str = "divisions";

    fn id(&self) -> i64 {
        self.id
    }

    fn filters() -> Vec<FilterField> {
        vec![FilterField::search()]
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Branches"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            or_dash(&self.branches_count),
        ]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![FieldSpec::text("name", "Name").required().max_len(120)])
    }
}
