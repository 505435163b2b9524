pub mod dom;
pub mod engine;
pub mod plan;
pub mod script;

pub use dom::{Dom, HtmlPage, ImageInfo};
pub use plan::{
    ExtractionPlan, ListField, ListStrategy, PlanLimits, StatusField, StatusSource, Strategy,
    TextField, UrlRule,
};
