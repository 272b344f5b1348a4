pub mod auth;
pub mod cache;
pub mod health;
pub mod processes;
pub mod tasks;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;
