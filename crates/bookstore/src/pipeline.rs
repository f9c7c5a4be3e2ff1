use mongodb::bson::{doc, Bson, Document};

/// One aggregation stage. Stages are rendered as-is; nothing here checks that a pipeline
/// makes sense.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Document),
    Group { id: Bson, accumulators: Document },
    Sort(Document),
    Limit(i64),
    Skip(i64),
    AddFields(Document),
    Project(Document),
    // Any stage without a dedicated variant, already in `{ $stage: ... }` form
    Raw(Document),
}

impl Stage {
    pub fn group(id: impl Into<Bson>, accumulators: Document) -> Self {
        Stage::Group { id: id.into(), accumulators }
    }

    pub fn to_document(&self) -> Document {
        match self {
            Stage::Match(filter) => doc! { "$match": filter.clone() },
            Stage::Group { id, accumulators } => {
                let mut group = doc! { "_id": id.clone() };
                for (name, accumulator) in accumulators {
                    group.insert(name.clone(), accumulator.clone());
                }
                doc! { "$group": group }
            }
            Stage::Sort(order) => doc! { "$sort": order.clone() },
            Stage::Limit(n) => doc! { "$limit": *n },
            Stage::Skip(n) => doc! { "$skip": *n },
            Stage::AddFields(fields) => doc! { "$addFields": fields.clone() },
            Stage::Project(fields) => doc! { "$project": fields.clone() },
            Stage::Raw(stage) => stage.clone(),
        }
    }
}

pub fn render(stages: &[Stage]) -> Vec<Document> {
    stages.iter().map(Stage::to_document).collect()
}

pub fn count_by_genre() -> Vec<Stage> {
    vec![
        Stage::group("$genre", doc! { "count": { "$sum": 1 } }),
        Stage::Sort(doc! { "_id": 1 }),
    ]
}

pub fn average_price_by_genre() -> Vec<Stage> {
    vec![
        Stage::group("$genre", doc! { "averagePrice": { "$avg": "$price" }, "count": { "$sum": 1 } }),
        Stage::Sort(doc! { "averagePrice": -1 }),
    ]
}

pub fn author_with_most_books() -> Vec<Stage> {
    vec![
        Stage::group("$author", doc! { "bookCount": { "$sum": 1 }, "books": { "$push": "$title" } }),
        Stage::Sort(doc! { "bookCount": -1 }),
        Stage::Limit(1),
    ]
}

pub fn books_by_decade() -> Vec<Stage> {
    vec![
        Stage::AddFields(doc! {
            "decade": { "$multiply": [{ "$floor": { "$divide": ["$published_year", 10] } }, 10] }
        }),
        Stage::group(
            "$decade",
            doc! {
                "count": { "$sum": 1 },
                "books": { "$push": { "title": "$title", "author": "$author", "year": "$published_year" } },
            },
        ),
        Stage::Sort(doc! { "_id": 1 }),
    ]
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;

    use super::*;

    #[test]
    fn test_group_puts_id_first() {
        let stage = Stage::group("$genre", doc! { "count": { "$sum": 1 } });
        let rendered = stage.to_document();
        let group = rendered.get_document("$group").unwrap();

        assert_eq!(group.keys().next().map(String::as_str), Some("_id"));
        assert_eq!(group, &doc! { "_id": "$genre", "count": { "$sum": 1 } });
    }

    #[test]
    fn test_render_keeps_order_and_raw_stages() {
        let stages = vec![
            Stage::Match(doc! { "in_stock": true }),
            Stage::Raw(doc! { "$sample": { "size": 3 } }),
            Stage::Skip(2),
            Stage::Limit(1),
        ];

        assert_eq!(
            render(&stages),
            vec![
                doc! { "$match": { "in_stock": true } },
                doc! { "$sample": { "size": 3 } },
                doc! { "$skip": 2_i64 },
                doc! { "$limit": 1_i64 },
            ]
        );
    }

    #[test]
    fn test_author_with_most_books_pipeline() {
        assert_eq!(
            render(&author_with_most_books()),
            vec![
                doc! { "$group": { "_id": "$author", "bookCount": { "$sum": 1 }, "books": { "$push": "$title" } } },
                doc! { "$sort": { "bookCount": -1 } },
                doc! { "$limit": 1_i64 },
            ]
        );
    }

    #[test]
    fn test_books_by_decade_pipeline() {
        let rendered = render(&books_by_decade());
        assert_eq!(rendered.len(), 3);
        assert_eq!(
            rendered[0],
            doc! { "$addFields": { "decade": { "$multiply": [{ "$floor": { "$divide": ["$published_year", 10] } }, 10] } } }
        );
        assert_eq!(rendered[1].get_document("$group").unwrap().get_str("_id").unwrap(), "$decade");
        assert_eq!(rendered[2], doc! { "$sort": { "_id": 1 } });
    }
}
