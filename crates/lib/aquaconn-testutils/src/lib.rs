pub mod site;
pub mod trajectory;
