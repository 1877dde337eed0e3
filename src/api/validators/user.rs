use regex::Regex;
use std::sync::LazyLock;

use super::{require_text, Validate};
use crate::db::models::user::NewUser;
use crate::error::Problems;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex")
});

impl Validate for NewUser {
    fn valid(&self) -> Problems {
        let mut problems = Problems::new();

        require_text(&mut problems, "name", &self.name);
        if require_text(&mut problems, "email", &self.email) && !EMAIL.is_match(self.email.trim()) {
            problems.insert("email".to_string(), "email is invalid".to_string());
        }
        require_text(&mut problems, "password", &self.password);

        problems
    }
}
