use super::{require_id, require_text, Validate};
use crate::db::models::comment::NewComment;
use crate::error::Problems;

impl Validate for NewComment {
    fn valid(&self) -> Problems {
        let mut problems = Problems::new();

        require_text(&mut problems, "message", &self.message);
        require_id(&mut problems, "user_id", self.user_id);
        require_id(&mut problems, "blog_id", self.blog_id);

        problems
    }
}
