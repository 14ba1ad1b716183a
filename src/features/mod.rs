pub mod admin;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod invoices;
pub mod pages;
pub mod reports;
pub mod users;
