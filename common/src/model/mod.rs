pub mod invoice;
pub mod outcome;
pub mod schema;
pub mod seller;
pub mod template;
