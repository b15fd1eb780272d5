use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

pub type BookId = i32;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// A book as stored by the backend.
/// `id` is assigned by the repository when the book is added, any id sent on creation is ignored
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BookId>,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
}
