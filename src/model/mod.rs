pub mod batch;
pub mod blog;
pub mod branch;
pub mod commerce;
pub mod course;
pub mod curriculum;
pub mod envelope;
pub mod login_response;
pub mod people;
pub mod reference;
pub mod session;
pub mod web_content;

pub use batch::Batch;
pub use blog::{BlogPost, JobCircular};
pub use branch::{Branch, Division};
pub use commerce::{Coupon, DiscountType, Enrollment, Review};
pub use course::{Category, Course};
pub use curriculum::{Chapter, Lesson};
pub use people::{Student, Teacher};
pub use web_content::{HeroSection, NewsFeed, Opportunity, Partner, Stats};
