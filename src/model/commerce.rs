//! Coupons, enrollments and reviews: the records a student's purchase produces.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::resource::{Resource, or_dash, yes_no};
use crate::core::schema::{FieldKind, FieldSpec, FilterField, FormSchema};
use crate::model::reference::{NamedRef, ref_name};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percent,
    Fixed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Coupon {
    pub id: i64,
    pub code: String,
    pub discount_type: DiscountType,
    pub amount: f64,

    #[serde(default)]
    pub max_uses: Option<u32>,

    #[serde(default)]
    pub used: u32,

    #[serde(default)]
    pub expires_at: Option<NaiveDate>,

    #[serde(default)]
    pub is_active: bool,
}

impl Resource for Coupon {
    const ENDPOINT: &'static str = "admin/coupons";
    const LIST_KEY: &'static str = "coupons";
    const TAG: &'static str = "coupons";
    const LABEL: &'static str = "coupons";

    fn id(&self) -> i64 {
        self.id
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Code", "Discount", "Used", "Expires", "Active"]
    }

    fn cells(&self) -> Vec<String> {
        let discount = match self.discount_type {
            DiscountType::Percent => format!("{}%", self.amount),
            DiscountType::Fixed => format!("{:.2}", self.amount),
        };
        let used = match self.max_uses {
            Some(max) => format!("{}/{max}", self.used),
            None => self.used.to_string(),
        };
        vec![
            self.id.to_string(),
            self.code.clone(),
            discount,
            used,
            or_dash(&self.expires_at),
            yes_no(self.is_active),
        ]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("code", "Code").required().max_len(32),
            FieldSpec::new("discount_type", "Discount type", FieldKind::Select).required(),
            FieldSpec::new("amount", "Amount", FieldKind::Number).required(),
            FieldSpec::new("max_uses", "Max uses", FieldKind::Number),
            FieldSpec::new("expires_at", "Expires at", FieldKind::Date),
            FieldSpec::new("is_active", "Active", FieldKind::Boolean),
        ])
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub id: i64,

    #[serde(default)]
    pub student: Option<NamedRef>,

    #[serde(default)]
    pub course: Option<NamedRef>,

    #[serde(default)]
    pub batch: Option<NamedRef>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub amount_paid: Option<f64>,

    #[serde(default)]
    pub coupon_code: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Resource for Enrollment {
    const ENDPOINT: &'static str = "admin/enrollments";
    const LIST_KEY: &'static str = "enrollments";
    const TAG: &'static str = "enrollments";
    const DEPENDENT_TAGS: &'static [&'static str] = &["batches", "stats", "my-enrollments"];
    const LABEL: &'static str = "enrollments";

    fn id(&self) -> i64 {
        self.id
    }

    fn filters() -> Vec<FilterField> {
        vec![
            FilterField::search(),
            FilterField::sort_order(),
            FilterField::select("status", "enrollment_statuses"),
            FilterField::select("course_id", "courses"),
            FilterField::select("branch_id", "branches"),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Student", "Course", "Batch", "Status", "Paid", "Enrolled"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            ref_name(&self.student),
            ref_name(&self.course),
            ref_name(&self.batch),
            or_dash(&self.status),
            self.amount_paid
                .map(|a| format!("{a:.2}"))
                .unwrap_or_else(|| "-".to_string()),
            self.created_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::new("student_id", "Student", FieldKind::Select).required(),
            FieldSpec::new("course_id", "Course", FieldKind::Select).required(),
            FieldSpec::new("batch_id", "Batch", FieldKind::Select),
            FieldSpec::text("coupon_code", "Coupon code").max_len(32),
            FieldSpec::new("amount_paid", "Amount paid", FieldKind::Number),
            FieldSpec::new("payment_receipt", "Payment receipt", FieldKind::File),
        ])
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Review {
    pub id: i64,

    #[serde(default)]
    pub student: Option<NamedRef>,

    #[serde(default)]
    pub course: Option<NamedRef>,

    pub rating: u8,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub status: Option<String>,
}

impl Resource for Review {
    const ENDPOINT: &'static str = "admin/reviews";
    const PUBLIC_ENDPOINT: Option<&'static str> = Some("reviews");
    const LIST_KEY: &'static str = "reviews";
    const TAG: &'static str = "reviews";
    const DEPENDENT_TAGS: &'static [&'static str] = &["home"];
    const LABEL: &'static str = "reviews";

    fn id(&self) -> i64 {
        self.id
    }

    fn filters() -> Vec<FilterField> {
        vec![
            FilterField::search(),
            FilterField::sort_order(),
            FilterField::select("status", "review_statuses"),
            FilterField::select("course_id", "courses"),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Student", "Course", "Rating", "Status"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            ref_name(&self.student),
            ref_name(&self.course),
            format!("{}/5", self.rating.min(5)),
            or_dash(&self.status),
        ]
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::new("course_id", "Course", FieldKind::Select).required(),
            FieldSpec::new("rating", "Rating", FieldKind::Number).required(),
            FieldSpec::new("comment", "Comment", FieldKind::TextArea).max_len(1000),
        ])
    }
}
