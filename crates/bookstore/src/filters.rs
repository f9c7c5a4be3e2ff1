//! Query documents for the book collection. An empty document matches every book.

use mongodb::bson::{doc, Document};

pub fn all() -> Document {
    doc! {}
}

pub fn by_title(title: &str) -> Document {
    doc! { "title": title }
}

pub fn by_genre(genre: &str) -> Document {
    doc! { "genre": genre }
}

pub fn by_author(author: &str) -> Document {
    doc! { "author": author }
}

pub fn published_after(year: i32) -> Document {
    doc! { "published_year": { "$gt": year } }
}

pub fn in_stock_published_after(year: i32) -> Document {
    doc! { "in_stock": true, "published_year": { "$gt": year } }
}

pub fn by_author_published_after(author: &str, year: i32) -> Document {
    doc! { "author": author, "published_year": { "$gt": year } }
}
