//! Locator tables, one module per page of the RealWorld app

pub mod article;
pub mod editor;
pub mod home;
pub mod login;
pub mod profile;
pub mod settings;
pub mod signup;
