use super::{max_chars, require_id, require_text, Validate};
use crate::db::models::blog::NewBlog;
use crate::error::Problems;

pub const MAX_TITLE_CHARS: usize = 255;
pub const MAX_CONTENT_CHARS: usize = 5000;

impl Validate for NewBlog {
    fn valid(&self) -> Problems {
        let mut problems = Problems::new();

        if require_text(&mut problems, "title", &self.title) {
            max_chars(&mut problems, "title", &self.title, MAX_TITLE_CHARS);
        }
        max_chars(&mut problems, "content", &self.content, MAX_CONTENT_CHARS);
        require_id(&mut problems, "author_id", self.author_id);

        problems
    }
}
