use derive_more::Display;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A stored book. Fields missing from a stored document read as their defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Display)]
#[display("\"{}\" by {} ({})", title, author, published_year)]
#[serde(default)]
pub struct Book {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: i32,
    pub price: f64,
    pub pages: i32,
    pub in_stock: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

impl Book {
    pub fn new(
        title: &str,
        author: &str,
        genre: &str,
        published_year: i32,
        price: f64,
        pages: i32,
        in_stock: bool,
    ) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            author: author.to_string(),
            genre: genre.to_string(),
            published_year,
            price,
            pages,
            in_stock,
            publisher: None,
        }
    }

    pub fn with_publisher(mut self, publisher: &str) -> Self {
        self.publisher = Some(publisher.to_string());
        self
    }
}

/// Projection of a book onto title, author and price.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BookListing {
    pub title: String,
    pub author: String,
    pub price: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GenreCount {
    // Null for documents without a genre
    #[serde(rename = "_id", default)]
    pub genre: Option<String>,
    pub count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GenrePriceSummary {
    #[serde(rename = "_id", default)]
    pub genre: Option<String>,
    // `$avg` is null when no document in the group has a numeric price
    #[serde(rename = "averagePrice", default)]
    pub average_price: Option<f64>,
    pub count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuthorBookCount {
    #[serde(rename = "_id", default)]
    pub author: Option<String>,
    #[serde(rename = "bookCount")]
    pub book_count: i64,
    #[serde(default)]
    pub books: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DecadeBook {
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DecadeBucket {
    // `$floor` yields a double on the server, null without a publication year
    #[serde(rename = "_id", default)]
    pub decade: Option<f64>,
    pub count: i64,
    #[serde(default)]
    pub books: Vec<DecadeBook>,
}

impl DecadeBucket {
    pub fn label(&self) -> String {
        match self.decade {
            Some(decade) => format!("{}s", decade as i64),
            None => "Unknown decade".to_string(),
        }
    }
}
